//! Directional light, light orbit, and shadow-map light-space transforms.

mod directional;
mod shadow;

pub use directional::{DirectionalLight, LightOrbit, light_direction_at_time};
pub use shadow::{LightTransform, LightingUniform, ShadowConfig, compute_light_transform};
