//! Conversions from the persisted [`Config`] into generator and lighting parameters.

use glam::Vec3;
use terragen_config::Config;
use terragen_lighting::{DirectionalLight, ShadowConfig};
use terragen_mesh::{Mesh, NormalMode, TerrainGenerator, TopologyError, TopologyParameters};
use terragen_terrain::{BiomeLadder, FbmDisplacement, FbmNoise, HeightRange, NoiseParameters};
use tracing::warn;

pub fn topology(config: &Config) -> TopologyParameters {
    TopologyParameters::new(
        config.terrain.longitude_slices,
        config.terrain.latitude_slices,
        config.terrain.radius,
    )
}

pub fn noise_parameters(config: &Config) -> NoiseParameters {
    NoiseParameters {
        seed: config.noise.seed,
        scale: config.noise.scale,
        lacunarity: config.noise.lacunarity,
        gain: config.noise.gain,
        octaves: config.noise.octaves,
    }
}

pub fn height_range(config: &Config) -> HeightRange {
    HeightRange {
        low: config.terrain.height_low,
        high: config.terrain.height_high,
    }
}

pub fn normal_mode(config: &Config) -> NormalMode {
    if config.terrain.recompute_normals {
        NormalMode::Recomputed
    } else {
        NormalMode::Radial
    }
}

/// Build the terrain mesh described by `config`.
pub fn generate_terrain(config: &Config) -> Result<Mesh, TopologyError> {
    TerrainGenerator::new(
        topology(config),
        FbmDisplacement::new(noise_parameters(config), height_range(config)),
        BiomeLadder::default(),
    )
    .with_relief(config.terrain.relief)
    .with_normals(normal_mode(config))
    .generate()
}

/// Slack between the displaced planet and the light volume walls.
const SHADOW_VOLUME_MARGIN: f32 = 1.1;

/// Upper bound on the distance of any displaced vertex from the planet centre.
pub fn max_displaced_radius(config: &Config) -> f32 {
    let amplitude = FbmNoise::new(noise_parameters(config)).max_amplitude();
    let range = height_range(config);
    let height = range.apply(amplitude).abs().max(range.apply(-amplitude).abs());
    config.terrain.radius.abs() + config.terrain.relief.abs() * height
}

/// Light volume from the config, grown to enclose the displaced planet.
pub fn shadow_config(config: &Config) -> ShadowConfig {
    let shadow = &config.shadow;
    let bound = max_displaced_radius(config) * SHADOW_VOLUME_MARGIN;

    let ortho_half_extent = shadow.ortho_half_extent.max(bound);
    let light_distance = shadow.light_distance.max(bound + shadow.near);
    let far = shadow.far.max(light_distance + bound);

    if ortho_half_extent != shadow.ortho_half_extent
        || light_distance != shadow.light_distance
        || far != shadow.far
    {
        warn!(
            "Shadow volume (extent {}, distance {}, far {}) does not enclose the planet, \
             using extent {ortho_half_extent}, distance {light_distance}, far {far}",
            shadow.ortho_half_extent, shadow.light_distance, shadow.far
        );
    }

    ShadowConfig {
        resolution: shadow.resolution,
        light_distance,
        ortho_half_extent,
        near: shadow.near,
        far,
        depth_bias: shadow.depth_bias,
    }
}

/// The configured light. A zero direction falls back to the default light direction.
pub fn directional_light(config: &Config) -> DirectionalLight {
    let light = &config.light;
    let color = Vec3::from_array(light.color);
    DirectionalLight::new(Vec3::from_array(light.direction), color, light.intensity)
        .unwrap_or_else(|| {
            warn!(
                "Light direction {:?} is degenerate, using the default",
                light.direction
            );
            DirectionalLight {
                color,
                intensity: light.intensity,
                ..DirectionalLight::default()
            }
        })
}

pub fn ambient(config: &Config) -> Vec3 {
    Vec3::from_array(config.light.ambient)
}

/// One-line summary of the generation parameters for the title bar and logs.
pub fn summary(config: &Config) -> String {
    format!(
        "{}x{} r={} relief={} octaves={} seed={}",
        config.terrain.longitude_slices,
        config.terrain.latitude_slices,
        config.terrain.radius,
        config.terrain.relief,
        config.noise.octaves,
        config.noise.seed,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use terragen_lighting::compute_light_transform;
    use terragen_terrain::Biome;

    fn small_config() -> Config {
        let mut config = Config::default();
        config.terrain.longitude_slices = 12;
        config.terrain.latitude_slices = 6;
        config
    }

    #[test]
    fn test_noise_parameters_follow_config() {
        let mut config = Config::default();
        config.noise.seed = 42;
        config.noise.octaves = 6;
        let params = noise_parameters(&config);
        assert_eq!(params.seed, 42);
        assert_eq!(params.octaves, 6);
        assert_eq!(params.scale, config.noise.scale);
        assert_eq!(params.lacunarity, config.noise.lacunarity);
        assert_eq!(params.gain, config.noise.gain);
    }

    #[test]
    fn test_shadow_config_follows_config() {
        let mut config = Config::default();
        config.shadow.resolution = 2048;
        config.shadow.depth_bias = 0.01;
        let shadow = shadow_config(&config);
        assert_eq!(shadow.resolution, 2048);
        assert_eq!(shadow.depth_bias, 0.01);
        assert_eq!(shadow.ortho_half_extent, config.shadow.ortho_half_extent);
    }

    #[test]
    fn test_default_shadow_volume_is_kept() {
        let config = Config::default();
        let shadow = shadow_config(&config);
        assert!(max_displaced_radius(&config) > config.terrain.radius);
        assert_eq!(shadow.ortho_half_extent, config.shadow.ortho_half_extent);
        assert_eq!(shadow.light_distance, config.shadow.light_distance);
        assert_eq!(shadow.far, config.shadow.far);
    }

    #[test]
    fn test_generated_vertices_within_max_radius() {
        let config = small_config();
        let bound = max_displaced_radius(&config);
        let mesh = generate_terrain(&config).unwrap();
        for v in &mesh.vertices {
            assert!(v.position().length() <= bound + 1e-3);
        }
    }

    #[test]
    fn test_large_planet_grows_light_volume() {
        let mut config = Config::default();
        config.terrain.radius = 50.0;
        let shadow = shadow_config(&config);
        let bound = max_displaced_radius(&config);
        assert!(bound > 50.0);
        assert!(shadow.light_distance - bound > shadow.near);
        assert!(shadow.ortho_half_extent > config.shadow.ortho_half_extent);

        let transform = compute_light_transform(directional_light(&config).direction, &shadow);
        let view_proj = transform.view_projection();
        for i in 0..=12 {
            let phi = std::f32::consts::PI * i as f32 / 12.0;
            for j in 0..24 {
                let theta = std::f32::consts::TAU * j as f32 / 24.0;
                let p = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin())
                    * bound;
                let ndc = view_proj.project_point3(p);
                assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0, "{p} -> {ndc}");
                assert!((0.0..=1.0).contains(&ndc.z), "{p} -> {ndc}");
            }
        }
    }

    #[test]
    fn test_directional_light_is_normalized() {
        let light = directional_light(&Config::default());
        assert!((light.direction.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_light_direction_falls_back() {
        let mut config = Config::default();
        config.light.direction = [0.0; 3];
        config.light.intensity = 2.5;
        let light = directional_light(&config);
        assert_eq!(light.direction, DirectionalLight::default().direction);
        assert_eq!(light.intensity, 2.5);
    }

    #[test]
    fn test_normal_mode_switch() {
        let mut config = Config::default();
        assert_eq!(normal_mode(&config), NormalMode::Radial);
        config.terrain.recompute_normals = true;
        assert_eq!(normal_mode(&config), NormalMode::Recomputed);
    }

    #[test]
    fn test_generate_terrain_counts() {
        let mesh = generate_terrain(&small_config()).unwrap();
        let stats = mesh.stats();
        assert_eq!(stats.vertex_count, 13 * 7);
        assert_eq!(stats.triangle_count, 12 * 5 * 2);
    }

    #[test]
    fn test_generate_terrain_applies_relief() {
        let mut config = small_config();
        config.terrain.relief = 0.0;
        let mesh = generate_terrain(&config).unwrap();
        for v in &mesh.vertices {
            assert!((v.position().length() - config.terrain.radius).abs() < 1e-3);
        }
    }

    #[test]
    fn test_flat_height_range_is_deep_water() {
        let mut config = small_config();
        config.terrain.height_low = 0.0;
        config.terrain.height_high = 0.0;
        let mesh = generate_terrain(&config).unwrap();
        let water = Biome::DeepWater.color().to_array();
        assert!(mesh.vertices.iter().all(|v| v.color == water));
    }

    #[test]
    fn test_invalid_topology_is_an_error() {
        let mut config = small_config();
        config.terrain.longitude_slices = 2;
        assert!(matches!(
            generate_terrain(&config),
            Err(TopologyError::TooFewLongitudeSlices { got: 2, .. })
        ));
    }

    #[test]
    fn test_summary_mentions_parameters() {
        let summary = summary(&Config::default());
        assert!(summary.contains("100x100"));
        assert!(summary.contains("octaves=4"));
    }
}
