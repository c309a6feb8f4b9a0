//! Recoverable rendering resource errors.

/// Errors raised while acquiring GPU resources for the terrain.
///
/// All of these are recoverable: the caller degrades (renders unshadowed, or
/// skips the terrain draw) instead of aborting.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The adapter cannot both render to and sample the depth format.
    #[error("depth format {0:?} cannot be rendered to and sampled on this adapter")]
    UnsupportedDepthFormat(wgpu::TextureFormat),

    /// Shadow map resolution is zero or above the device texture limit.
    #[error("shadow map resolution {requested} is outside 1..={max}")]
    InvalidShadowResolution { requested: u32, max: u32 },

    /// The mesh has no vertices or no indices.
    #[error("mesh has no geometry to upload")]
    EmptyMesh,

    /// A buffer would exceed the device's maximum buffer size.
    #[error("{kind} buffer needs {size} bytes, device limit is {limit}")]
    BufferTooLarge {
        kind: &'static str,
        size: u64,
        limit: u64,
    },
}
