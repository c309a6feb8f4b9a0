//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level terragen configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Sphere topology and displacement settings.
    pub terrain: TerrainConfig,
    /// Fractal noise settings.
    pub noise: NoiseConfig,
    /// Shadow map settings.
    pub shadow: ShadowConfig,
    /// Directional light settings.
    pub light: LightConfig,
    /// Scripted orbit camera settings.
    pub camera: CameraConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title prefix. Mesh statistics are appended when enabled.
    pub title: String,
}

/// UV-sphere topology and displacement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// Number of meridian slices (>= 3).
    pub longitude_slices: u32,
    /// Number of latitude bands (>= 2).
    pub latitude_slices: u32,
    /// Undisplaced sphere radius in world units.
    pub radius: f32,
    /// World units of radial offset per unit of displacement.
    pub relief: f32,
    /// Recompute normals from the displaced surface instead of the radial direction.
    pub recompute_normals: bool,
    /// Displacement produced by noise value -1.
    pub height_low: f32,
    /// Displacement produced by noise value +1.
    pub height_high: f32,
}

/// Fractal Brownian motion parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NoiseConfig {
    /// Permutation seed.
    pub seed: u32,
    /// Spatial scale; sample coordinates are divided by this.
    pub scale: f32,
    /// Frequency multiplier per octave.
    pub lacunarity: f32,
    /// Amplitude multiplier per octave.
    pub gain: f32,
    /// Number of octaves summed.
    pub octaves: u32,
}

/// Shadow map configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShadowConfig {
    /// Render the depth capture pass at all.
    pub enabled: bool,
    /// Shadow map width and height in texels.
    pub resolution: u32,
    /// Distance of the light camera from the origin.
    pub light_distance: f32,
    /// Half extent of the light's orthographic volume.
    pub ortho_half_extent: f32,
    /// Light camera near plane.
    pub near: f32,
    /// Light camera far plane.
    pub far: f32,
    /// Depth offset applied before the shadow comparison.
    pub depth_bias: f32,
}

/// Directional light configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightConfig {
    /// Direction the light travels (from the light toward the scene).
    pub direction: [f32; 3],
    /// Linear RGB color.
    pub color: [f32; 3],
    /// Scalar intensity.
    pub intensity: f32,
    /// Linear RGB ambient term.
    pub ambient: [f32; 3],
    /// Orbit speed of the light around the Y axis in radians per second.
    pub orbit_speed: f32,
}

/// Scripted orbit camera configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Horizontal distance from the Y axis.
    pub distance: f32,
    /// Height above the XZ plane.
    pub height: f32,
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Orbit speed in radians per second.
    pub orbit_speed: f32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log filter override (e.g., "debug", "info,wgpu=warn"). Empty keeps the default filter.
    pub log_level: String,
    /// Mirror mesh statistics and live parameters into the window title.
    pub show_stats: bool,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 800,
            vsync: true,
            title: "terragen".to_string(),
        }
    }
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            longitude_slices: 100,
            latitude_slices: 100,
            radius: 10.0,
            relief: 10.0,
            recompute_normals: false,
            height_low: 0.0,
            height_high: 0.5,
        }
    }
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            scale: 10.0,
            lacunarity: 2.0,
            gain: 0.5,
            octaves: 4,
        }
    }
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            resolution: 1024,
            light_distance: 40.0,
            ortho_half_extent: 20.0,
            near: 0.1,
            far: 100.0,
            depth_bias: 0.002,
        }
    }
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            direction: [0.35, -1.0, -0.35],
            color: [1.0, 0.96, 0.9],
            intensity: 1.0,
            ambient: [0.1, 0.1, 0.12],
            orbit_speed: 0.2,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 70.0,
            height: 50.0,
            fov_y_degrees: 45.0,
            orbit_speed: 0.15,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: String::new(),
            show_stats: true,
        }
    }
}

/// Resolve the per-user terragen config directory.
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("terragen"))
        .ok_or(ConfigError::NoConfigDir)
}

// --- Load / Save ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(false)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("longitude_slices: 100"));
        assert!(ron_str.contains("resolution: 1024"));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(window: (), terrain: (radius: 4.0))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.noise, NoiseConfig::default());
        assert_eq!(config.shadow, ShadowConfig::default());
        assert_eq!(config.terrain.radius, 4.0);
        assert_eq!(config.terrain.latitude_slices, 100);
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_default_topology_is_valid() {
        let terrain = TerrainConfig::default();
        assert!(terrain.longitude_slices >= 3);
        assert!(terrain.latitude_slices >= 2);
        assert!(terrain.radius > 0.0);
        assert!(terrain.height_high > terrain.height_low);
    }

    #[test]
    fn test_default_noise_matches_fbm_reference() {
        let noise = NoiseConfig::default();
        assert_eq!(noise.octaves, 4);
        assert_eq!(noise.lacunarity, 2.0);
        assert_eq!(noise.gain, 0.5);
    }

    #[test]
    fn test_shadow_volume_encloses_planet() {
        let config = Config::default();
        let max_extent = config.terrain.radius
            + config.terrain.relief * config.terrain.height_high.abs().max(config.terrain.height_low.abs());
        assert!(config.shadow.ortho_half_extent >= max_extent);
        assert!(config.shadow.far > config.shadow.light_distance + max_extent);
        assert!(config.shadow.light_distance - max_extent > config.shadow.near);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.terrain.longitude_slices = 64;
        config.noise.seed = 1234;
        config.light.direction = [0.0, -1.0, 0.0];

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_default_log_level_is_empty() {
        assert!(Config::default().debug.log_level.is_empty());
        let config: Config = ron::from_str("(debug: (show_stats: false))").unwrap();
        assert!(config.debug.log_level.is_empty());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.ron"), "{{not valid}}").unwrap();
        let result = Config::load_or_create(dir.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
