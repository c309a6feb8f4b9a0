//! Configuration system for terragen.
//!
//! Generation, shadow and camera parameters are runtime settings persisted to
//! disk as RON. CLI flags override the loaded values, and unknown or missing
//! fields fall back to defaults so old config files keep loading.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CameraConfig, Config, DebugConfig, LightConfig, NoiseConfig, ShadowConfig, TerrainConfig,
    WindowConfig, default_config_dir,
};
pub use error::ConfigError;
