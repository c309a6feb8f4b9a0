//! The seam between the shadow pass state machine and a concrete renderer.
//!
//! [`ShadowPass`](crate::ShadowPass) only speaks these traits, so its
//! ordering can be tested against a recording double without a GPU.

use terragen_lighting::LightingUniform;

use crate::error::RenderError;

/// Where a pass renders.
#[derive(Debug)]
pub enum PassTarget<'a, T> {
    /// An offscreen depth target such as the shadow map.
    Offscreen(&'a T),
    /// The window surface with its depth buffer.
    Screen,
}

/// How a mesh is shaded in a draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Material {
    /// Depth writes only, from the light's point of view.
    DepthOnly,
    /// Diffuse plus ambient, shadowed when a shadow map is bound.
    Lit,
}

/// Creates the depth targets shadow passes render into.
pub trait ShadowTargetAllocator {
    type Target;

    /// Allocate a square depth target of `resolution` texels per side.
    fn create_shadow_target(&mut self, resolution: u32) -> Result<Self::Target, RenderError>;
}

/// Pass-level drawing commands.
///
/// Every `begin_pass` is matched by one `end_pass`. `bind_shadow_map` and
/// `set_lighting` affect the draws that follow them in the current frame.
pub trait RenderBackend {
    type Target;
    type Mesh: ?Sized;

    fn begin_pass(&mut self, target: PassTarget<'_, Self::Target>);
    /// Clear color (if any) and depth of the current pass.
    fn clear(&mut self);
    fn bind_shadow_map(&mut self, target: &Self::Target);
    fn set_lighting(&mut self, lighting: &LightingUniform);
    fn draw_mesh(&mut self, mesh: &Self::Mesh, material: Material, view_proj: glam::Mat4);
    fn end_pass(&mut self);
}
