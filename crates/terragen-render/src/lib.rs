//! wgpu rendering for the terrain planet: GPU context, mesh upload, the
//! directional shadow pass, and the lit composite pass.

pub mod backend;
pub mod buffer;
pub mod camera;
pub mod depth;
pub mod error;
pub mod gpu;
pub mod lit_pipeline;
pub mod mesh_resource;
pub mod pass;
pub mod renderer;
pub mod shadow_pass;
pub mod shadow_pipeline;

pub use backend::{Material, PassTarget, RenderBackend, ShadowTargetAllocator};
pub use buffer::{BufferAllocator, INDEX_FORMAT, MeshBuffer};
pub use camera::{Camera, ViewProjUniform};
pub use depth::{DepthBuffer, ShadowTarget};
pub use error::RenderError;
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use lit_pipeline::{LitBindGroupLayouts, LitPipeline, lit_shader_source};
pub use mesh_resource::MeshResource;
pub use pass::{DepthAttachmentConfig, FrameEncoder, RenderPassBuilder, SPACE_BLACK};
pub use renderer::{TerrainRenderer, WgpuFrame};
pub use shadow_pass::{ShadowCapture, ShadowPass};
pub use shadow_pipeline::{SHADOW_SHADER_SOURCE, ShadowPipeline};
