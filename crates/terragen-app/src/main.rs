//! Terragen binary: generate the noise-displaced planet, then render it with a
//! directional shadow pass.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p terragen-app -- --dry-run` to generate the mesh without a window.

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use terragen_app::{settings, window};
use terragen_config::{CliArgs, Config, default_config_dir};
use tracing::{error, info};

fn main() {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(|| {
        default_config_dir().unwrap_or_else(|e| {
            eprintln!("{e}, using the working directory");
            PathBuf::from(".")
        })
    });

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    terragen_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    info!("Generating terrain: {}", settings::summary(&config));
    let start = Instant::now();
    let mesh = match settings::generate_terrain(&config) {
        Ok(mesh) => mesh,
        Err(e) => {
            error!("Terrain generation failed: {e}");
            std::process::exit(1);
        }
    };
    info!(
        "Terrain generated in {:.1}ms: {}",
        start.elapsed().as_secs_f64() * 1000.0,
        mesh.stats()
    );

    if args.dry_run {
        return;
    }

    if let Err(e) = window::run(config, mesh) {
        error!("Event loop failed: {e}");
        std::process::exit(1);
    }
}
