//! Command-line argument parsing for terragen.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// terragen command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "terragen", about = "Noise-displaced planet with a directional shadow pass")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Number of longitude slices.
    #[arg(long)]
    pub longitude_slices: Option<u32>,

    /// Number of latitude slices.
    #[arg(long)]
    pub latitude_slices: Option<u32>,

    /// Base sphere radius.
    #[arg(long)]
    pub radius: Option<f32>,

    /// Noise octave count.
    #[arg(long)]
    pub octaves: Option<u32>,

    /// Noise permutation seed.
    #[arg(long)]
    pub seed: Option<u32>,

    /// Shadow map resolution in texels.
    #[arg(long)]
    pub shadow_resolution: Option<u32>,

    /// Disable the shadow capture pass.
    #[arg(long)]
    pub no_shadows: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Generate the mesh, log its statistics and exit without opening a window.
    #[arg(long)]
    pub dry_run: bool,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(lon) = args.longitude_slices {
            self.terrain.longitude_slices = lon;
        }
        if let Some(lat) = args.latitude_slices {
            self.terrain.latitude_slices = lat;
        }
        if let Some(radius) = args.radius {
            self.terrain.radius = radius;
        }
        if let Some(octaves) = args.octaves {
            self.noise.octaves = octaves;
        }
        if let Some(seed) = args.seed {
            self.noise.seed = seed;
        }
        if let Some(res) = args.shadow_resolution {
            self.shadow.resolution = res;
        }
        if args.no_shadows {
            self.shadow.enabled = false;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
