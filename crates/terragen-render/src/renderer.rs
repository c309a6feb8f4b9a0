//! wgpu implementation of the render backend seam.
//!
//! [`TerrainRenderer`] owns the pipelines, uniform buffers, main depth buffer
//! and the comparison sampler, and allocates shadow targets. [`WgpuFrame`]
//! borrows it for one frame and turns backend calls into render passes on a
//! command encoder.
//!
//! Uniform writes go through `Queue::write_buffer`, which lands before the
//! frame's command buffer executes. Each uniform buffer is therefore written
//! at most once per frame: the light matrix by the depth draw, the camera
//! matrix by the lit draw, the lighting block by `set_lighting`.

use terragen_lighting::LightingUniform;

use crate::backend::{Material, PassTarget, RenderBackend, ShadowTargetAllocator};
use crate::buffer::BufferAllocator;
use crate::camera::ViewProjUniform;
use crate::depth::{DepthBuffer, ShadowTarget};
use crate::error::RenderError;
use crate::gpu::RenderContext;
use crate::lit_pipeline::{LitBindGroupLayouts, LitPipeline};
use crate::mesh_resource::MeshResource;
use crate::pass::{RenderPassBuilder, SPACE_BLACK};
use crate::shadow_pipeline::ShadowPipeline;

/// A uniform buffer with its single-entry bind group.
struct UniformSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl UniformSlot {
    fn new(device: &wgpu::Device, label: &str, layout: &wgpu::BindGroupLayout, data: &[u8]) -> Self {
        let buffer = BufferAllocator::new(device).create_uniform_buffer(label, data);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self { buffer, bind_group }
    }
}

/// Long-lived GPU state for drawing the terrain.
pub struct TerrainRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    depth_sampleable: bool,
    layouts: LitBindGroupLayouts,
    shadow_pipeline: ShadowPipeline,
    lit_shadowed: LitPipeline,
    lit_unshadowed: LitPipeline,
    shadow_sampler: wgpu::Sampler,
    depth: DepthBuffer,
    light_view_proj: UniformSlot,
    camera: UniformSlot,
    lighting: UniformSlot,
    clear_color: wgpu::Color,
}

impl TerrainRenderer {
    pub fn new(
        adapter: &wgpu::Adapter,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let required = wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING;
        let depth_sampleable = adapter
            .get_texture_format_features(DepthBuffer::FORMAT)
            .allowed_usages
            .contains(required);

        let layouts = LitBindGroupLayouts::new(device);
        let shadow_pipeline = ShadowPipeline::new(device, &layouts.view_proj);
        let lit_shadowed = LitPipeline::new(device, surface_format, &layouts, true);
        let lit_unshadowed = LitPipeline::new(device, surface_format, &layouts, false);

        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("shadow-comparison-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(DepthBuffer::COMPARE_FUNCTION),
            ..Default::default()
        });

        let identity = ViewProjUniform::from_matrix(glam::Mat4::IDENTITY);
        let light_view_proj = UniformSlot::new(
            device,
            "light-view-proj",
            &layouts.view_proj,
            bytemuck::bytes_of(&identity),
        );
        let camera = UniformSlot::new(
            device,
            "camera-view-proj",
            &layouts.view_proj,
            bytemuck::bytes_of(&identity),
        );
        let lighting = UniformSlot::new(
            device,
            "lighting",
            &layouts.lighting,
            bytemuck::bytes_of(&<LightingUniform as bytemuck::Zeroable>::zeroed()),
        );

        Self {
            device: device.clone(),
            queue: queue.clone(),
            depth_sampleable,
            layouts,
            shadow_pipeline,
            lit_shadowed,
            lit_unshadowed,
            shadow_sampler,
            depth: DepthBuffer::new(device, width, height),
            light_view_proj,
            camera,
            lighting,
            clear_color: SPACE_BLACK,
        }
    }

    pub fn from_context(ctx: &RenderContext) -> Self {
        let (width, height) = ctx.size();
        Self::new(
            &ctx.adapter,
            &ctx.device,
            &ctx.queue,
            ctx.surface_format(),
            width,
            height,
        )
    }

    /// Keep the main depth buffer matched to the surface.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.depth.resize(&self.device, width, height);
    }

    pub fn depth_buffer(&self) -> &DepthBuffer {
        &self.depth
    }

    /// Start recording one frame into `encoder`, presenting to `surface_view`.
    pub fn begin_frame<'a>(
        &'a self,
        encoder: &'a mut wgpu::CommandEncoder,
        surface_view: &'a wgpu::TextureView,
    ) -> WgpuFrame<'a> {
        WgpuFrame {
            renderer: self,
            encoder,
            surface_view,
            pass: None,
            shadow_bind_group: None,
        }
    }
}

impl ShadowTargetAllocator for TerrainRenderer {
    type Target = ShadowTarget;

    fn create_shadow_target(&mut self, resolution: u32) -> Result<ShadowTarget, RenderError> {
        validate_shadow_target(
            self.depth_sampleable,
            resolution,
            self.device.limits().max_texture_dimension_2d,
        )?;
        Ok(ShadowTarget::new(
            &self.device,
            resolution,
            &self.layouts.shadow_map,
            &self.shadow_sampler,
        ))
    }
}

fn validate_shadow_target(
    depth_sampleable: bool,
    resolution: u32,
    max: u32,
) -> Result<(), RenderError> {
    if !depth_sampleable {
        return Err(RenderError::UnsupportedDepthFormat(DepthBuffer::FORMAT));
    }
    if resolution == 0 || resolution > max {
        return Err(RenderError::InvalidShadowResolution {
            requested: resolution,
            max,
        });
    }
    Ok(())
}

enum ActiveTarget {
    Offscreen(wgpu::TextureView),
    Screen,
}

struct ActivePass {
    target: ActiveTarget,
    clear_pending: bool,
}

/// One frame of backend calls recorded into a command encoder.
///
/// A pass is encoded lazily: `clear` is folded into the load op of the next
/// draw, and a pass with a clear but no draws encodes an empty clearing pass
/// at `end_pass`.
pub struct WgpuFrame<'a> {
    renderer: &'a TerrainRenderer,
    encoder: &'a mut wgpu::CommandEncoder,
    surface_view: &'a wgpu::TextureView,
    pass: Option<ActivePass>,
    shadow_bind_group: Option<wgpu::BindGroup>,
}

impl<'a> WgpuFrame<'a> {
    fn pass_builder(&self, pass: &ActivePass) -> RenderPassBuilder {
        let r = self.renderer;
        match &pass.target {
            ActiveTarget::Offscreen(view) => {
                let builder = RenderPassBuilder::new().label("shadow-capture");
                if pass.clear_pending {
                    builder.depth(view.clone(), DepthBuffer::CLEAR_VALUE)
                } else {
                    builder.depth_load(view.clone())
                }
            }
            ActiveTarget::Screen => {
                let builder = RenderPassBuilder::new().label("terrain-lit");
                if pass.clear_pending {
                    builder
                        .clear_color(r.clear_color)
                        .depth(r.depth.view.clone(), DepthBuffer::CLEAR_VALUE)
                } else {
                    builder.load_color().depth_load(r.depth.view.clone())
                }
            }
        }
    }

    fn color_view(&self, pass: &ActivePass) -> Option<&'a wgpu::TextureView> {
        match pass.target {
            ActiveTarget::Offscreen(_) => None,
            ActiveTarget::Screen => Some(self.surface_view),
        }
    }
}

impl RenderBackend for WgpuFrame<'_> {
    type Target = ShadowTarget;
    type Mesh = MeshResource;

    fn begin_pass(&mut self, target: PassTarget<'_, ShadowTarget>) {
        if self.pass.is_some() {
            log::warn!("begin_pass while a pass is open; closing it");
            self.end_pass();
        }
        let target = match target {
            PassTarget::Offscreen(shadow) => ActiveTarget::Offscreen(shadow.view.clone()),
            PassTarget::Screen => ActiveTarget::Screen,
        };
        self.pass = Some(ActivePass {
            target,
            clear_pending: false,
        });
    }

    fn clear(&mut self) {
        match &mut self.pass {
            Some(pass) => pass.clear_pending = true,
            None => log::warn!("clear outside a pass ignored"),
        }
    }

    fn bind_shadow_map(&mut self, target: &ShadowTarget) {
        self.shadow_bind_group = Some(target.bind_group.clone());
    }

    fn set_lighting(&mut self, lighting: &LightingUniform) {
        let r = self.renderer;
        r.queue
            .write_buffer(&r.lighting.buffer, 0, bytemuck::bytes_of(lighting));
    }

    fn draw_mesh(&mut self, mesh: &MeshResource, material: Material, view_proj: glam::Mat4) {
        let Some(pass) = self.pass.take() else {
            log::warn!("draw_mesh outside a pass ignored");
            return;
        };
        let r = self.renderer;
        let uniform = ViewProjUniform::from_matrix(view_proj);

        let selected = match (&pass.target, material) {
            (ActiveTarget::Offscreen(_), Material::DepthOnly) => {
                Some((&r.shadow_pipeline.pipeline, &r.light_view_proj, None))
            }
            (ActiveTarget::Screen, Material::Lit) => Some(match &self.shadow_bind_group {
                Some(group) => (&r.lit_shadowed.pipeline, &r.camera, Some(group.clone())),
                None => (&r.lit_unshadowed.pipeline, &r.camera, None),
            }),
            _ => None,
        };
        let Some((pipeline, view_proj_slot, shadow_group)) = selected else {
            log::warn!("{material:?} draw does not match the open pass; skipped");
            self.pass = Some(pass);
            return;
        };
        r.queue
            .write_buffer(&view_proj_slot.buffer, 0, bytemuck::bytes_of(&uniform));

        let builder = self.pass_builder(&pass);
        let color_view = self.color_view(&pass);
        {
            let mut render_pass = builder.begin(self.encoder, color_view);
            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(0, &view_proj_slot.bind_group, &[]);
            if material == Material::Lit {
                render_pass.set_bind_group(1, &r.lighting.bind_group, &[]);
            }
            if let Some(group) = &shadow_group {
                render_pass.set_bind_group(2, group, &[]);
            }
            mesh.buffer().bind(&mut render_pass);
            mesh.buffer().draw(&mut render_pass);
        }

        self.pass = Some(ActivePass {
            clear_pending: false,
            ..pass
        });
    }

    fn end_pass(&mut self) {
        let Some(pass) = self.pass.take() else {
            log::warn!("end_pass without an open pass");
            return;
        };
        if pass.clear_pending {
            let builder = self.pass_builder(&pass);
            let color_view = self.color_view(&pass);
            drop(builder.begin(self.encoder, color_view));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shadow_pass::ShadowPass;
    use terragen_lighting::{DirectionalLight, ShadowConfig};
    use terragen_mesh::TopologyParameters;
    use terragen_terrain::NoiseParameters;

    const TEST_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    fn create_test_gpu() -> Option<(wgpu::Adapter, wgpu::Device, wgpu::Queue)> {
        pollster::block_on(async {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
                backends: wgpu::Backends::all(),
                ..Default::default()
            });
            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions::default())
                .await
                .ok()?;
            let (device, queue) = adapter
                .request_device(&wgpu::DeviceDescriptor::default())
                .await
                .ok()?;
            Some((adapter, device, queue))
        })
    }

    fn color_target(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("test-color-target"),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: TEST_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default())
    }

    #[test]
    fn test_validate_rejects_unsampleable_depth() {
        assert!(matches!(
            validate_shadow_target(false, 1024, 8192),
            Err(RenderError::UnsupportedDepthFormat(wgpu::TextureFormat::Depth32Float))
        ));
    }

    #[test]
    fn test_validate_resolution_bounds() {
        assert!(matches!(
            validate_shadow_target(true, 0, 8192),
            Err(RenderError::InvalidShadowResolution { requested: 0, max: 8192 })
        ));
        assert!(matches!(
            validate_shadow_target(true, 8193, 8192),
            Err(RenderError::InvalidShadowResolution { requested: 8193, .. })
        ));
        assert!(validate_shadow_target(true, 1, 8192).is_ok());
        assert!(validate_shadow_target(true, 8192, 8192).is_ok());
    }

    #[test]
    fn test_allocator_rejects_oversized_target() {
        let Some((adapter, device, queue)) = create_test_gpu() else {
            return;
        };
        let mut renderer = TerrainRenderer::new(&adapter, &device, &queue, TEST_FORMAT, 64, 64);
        let max = device.limits().max_texture_dimension_2d;
        assert!(renderer.create_shadow_target(max + 1).is_err());
        assert!(renderer.create_shadow_target(0).is_err());
    }

    #[test]
    fn test_resize_tracks_surface() {
        let Some((adapter, device, queue)) = create_test_gpu() else {
            return;
        };
        let mut renderer = TerrainRenderer::new(&adapter, &device, &queue, TEST_FORMAT, 64, 64);
        renderer.resize(320, 200);
        assert_eq!(renderer.depth_buffer().width(), 320);
        assert_eq!(renderer.depth_buffer().height(), 200);
    }

    #[test]
    fn test_full_frame_encodes_and_submits() {
        let Some((adapter, device, queue)) = create_test_gpu() else {
            return;
        };
        let mut renderer = TerrainRenderer::new(&adapter, &device, &queue, TEST_FORMAT, 128, 96);
        let pass = ShadowPass::new(
            &mut renderer,
            ShadowConfig {
                resolution: 256,
                ..ShadowConfig::default()
            },
            DirectionalLight::default(),
            glam::Vec3::splat(0.1),
        );

        let mesh = terragen_mesh::generate(
            TopologyParameters::new(16, 8, 10.0),
            &NoiseParameters::default(),
        )
        .unwrap();
        let resource = MeshResource::upload(&device, mesh).unwrap();
        let view = color_target(&device, 128, 96);
        let camera_vp = glam::Mat4::perspective_rh(0.8, 128.0 / 96.0, 500.0, 0.1)
            * glam::Mat4::look_at_rh(glam::Vec3::new(30.0, 20.0, 0.0), glam::Vec3::ZERO, glam::Vec3::Y);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("test-frame"),
        });
        {
            let mut frame = renderer.begin_frame(&mut encoder, &view);
            pass.render_frame(&mut frame, Some(&resource), camera_vp, 0.0);
        }
        queue.submit([encoder.finish()]);
    }

    #[test]
    fn test_frame_without_mesh_still_clears() {
        let Some((adapter, device, queue)) = create_test_gpu() else {
            return;
        };
        let renderer = TerrainRenderer::new(&adapter, &device, &queue, TEST_FORMAT, 32, 32);
        let pass: ShadowPass<ShadowTarget> = ShadowPass::disabled(
            ShadowConfig::default(),
            DirectionalLight::default(),
            glam::Vec3::ZERO,
        );
        let view = color_target(&device, 32, 32);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("test-empty-frame"),
        });
        {
            let mut frame = renderer.begin_frame(&mut encoder, &view);
            pass.render_frame(&mut frame, None, glam::Mat4::IDENTITY, 0.0);
        }
        queue.submit([encoder.finish()]);
    }
}
