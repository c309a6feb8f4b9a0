//! Render pass abstraction for reducing wgpu boilerplate.
//!
//! Provides [`RenderPassBuilder`] for declarative render pass configuration
//! and [`FrameEncoder`] for managing per-frame command encoding lifecycle.

/// Near-black with a blue tint: the space behind the planet.
pub const SPACE_BLACK: wgpu::Color = wgpu::Color {
    r: 0.02,
    g: 0.02,
    b: 0.08,
    a: 1.0,
};

/// Configuration for depth stencil attachment. `clear_value: None` loads the
/// previous contents.
#[derive(Debug)]
pub struct DepthAttachmentConfig {
    pub view: wgpu::TextureView,
    pub clear_value: Option<f32>,
}

/// Builder for configuring render pass descriptors with a fluent API.
///
/// A pass may have a color attachment, a depth attachment, or both. The
/// shadow capture uses depth only.
#[derive(Debug)]
pub struct RenderPassBuilder {
    clear_color: Option<wgpu::Color>,
    depth_attachment: Option<DepthAttachmentConfig>,
    label: Option<&'static str>,
}

impl Default for RenderPassBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderPassBuilder {
    /// Create a builder that clears color to [`SPACE_BLACK`].
    pub fn new() -> Self {
        Self {
            clear_color: Some(SPACE_BLACK),
            depth_attachment: None,
            label: None,
        }
    }

    /// Set the clear color for the color attachment.
    pub fn clear_color(mut self, color: wgpu::Color) -> Self {
        self.clear_color = Some(color);
        self
    }

    /// Keep the existing color contents instead of clearing.
    pub fn load_color(mut self) -> Self {
        self.clear_color = None;
        self
    }

    /// Attach a depth view cleared to `clear_value`.
    pub fn depth(mut self, view: wgpu::TextureView, clear_value: f32) -> Self {
        self.depth_attachment = Some(DepthAttachmentConfig {
            view,
            clear_value: Some(clear_value),
        });
        self
    }

    /// Attach a depth view and keep its existing contents.
    pub fn depth_load(mut self, view: wgpu::TextureView) -> Self {
        self.depth_attachment = Some(DepthAttachmentConfig {
            view,
            clear_value: None,
        });
        self
    }

    /// Set debug label for the render pass.
    pub fn label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    /// Begin the pass on `encoder`. Pass `None` for `color_view` to encode a
    /// depth-only pass.
    pub fn begin<'encoder>(
        &self,
        encoder: &'encoder mut wgpu::CommandEncoder,
        color_view: Option<&'encoder wgpu::TextureView>,
    ) -> wgpu::RenderPass<'encoder> {
        let color_attachment = color_view.map(|view| wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: match self.clear_color {
                    Some(color) => wgpu::LoadOp::Clear(color),
                    None => wgpu::LoadOp::Load,
                },
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        });

        let depth_stencil_attachment =
            self.depth_attachment
                .as_ref()
                .map(|depth| wgpu::RenderPassDepthStencilAttachment {
                    view: &depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: match depth.clear_value {
                            Some(value) => wgpu::LoadOp::Clear(value),
                            None => wgpu::LoadOp::Load,
                        },
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                });

        let color_attachments: Vec<_> = color_attachment.into_iter().map(Some).collect();
        let descriptor = wgpu::RenderPassDescriptor {
            label: self.label,
            color_attachments: &color_attachments,
            depth_stencil_attachment,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        };

        encoder.begin_render_pass(&descriptor)
    }
}

/// Manages per-frame command encoding lifecycle with automatic submission.
pub struct FrameEncoder {
    encoder: Option<wgpu::CommandEncoder>,
    queue: wgpu::Queue,
    surface_texture: Option<wgpu::SurfaceTexture>,
    surface_view: wgpu::TextureView,
    submitted: bool,
}

impl FrameEncoder {
    pub fn new(
        device: &wgpu::Device,
        queue: wgpu::Queue,
        surface_texture: wgpu::SurfaceTexture,
    ) -> Self {
        let encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame-encoder"),
        });

        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            encoder: Some(encoder),
            queue,
            surface_texture: Some(surface_texture),
            surface_view,
            submitted: false,
        }
    }

    /// The command encoder and the surface view it targets, or `None` once submitted.
    pub fn encoder_and_view(&mut self) -> Option<(&mut wgpu::CommandEncoder, &wgpu::TextureView)> {
        let encoder = self.encoder.as_mut()?;
        Some((encoder, &self.surface_view))
    }

    /// Submit the command buffer and present the surface texture.
    /// Consumes self to prevent double-submission.
    pub fn submit(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        if self.submitted {
            return;
        }
        if let (Some(encoder), Some(surface_texture)) =
            (self.encoder.take(), self.surface_texture.take())
        {
            self.queue.submit([encoder.finish()]);
            surface_texture.present();
            self.submitted = true;
        }
    }
}

impl Drop for FrameEncoder {
    fn drop(&mut self) {
        if !self.submitted && self.encoder.is_some() {
            log::warn!("FrameEncoder dropped without explicit submit() - auto-submitting");
            self.finish();
        }
    }
}
