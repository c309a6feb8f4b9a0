//! Depth-only render pipeline for shadow map generation.
//!
//! Renders the terrain from the light's perspective into the square shadow
//! map. No color output, only depth writes.

use terragen_mesh::TERRAIN_VERTEX_LAYOUT;

use crate::depth::DepthBuffer;

/// WGSL shader source for shadow depth-only rendering.
///
/// Reads only the vertex position; the rest of the terrain vertex is ignored.
pub const SHADOW_SHADER_SOURCE: &str = r#"
struct LightMatrix {
    view_proj: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> light: LightMatrix;

struct VertexInput {
    @location(0) position: vec3<f32>,
};

@vertex
fn vs_shadow(in: VertexInput) -> @builtin(position) vec4<f32> {
    return light.view_proj * vec4<f32>(in.position, 1.0);
}
"#;

/// Depth-only pipeline for rendering the shadow map.
pub struct ShadowPipeline {
    pub pipeline: wgpu::RenderPipeline,
}

impl ShadowPipeline {
    /// `light_layout` is the single-matrix layout from
    /// [`ViewProjUniform::bind_group_layout`](crate::ViewProjUniform::bind_group_layout).
    pub fn new(device: &wgpu::Device, light_layout: &wgpu::BindGroupLayout) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shadow-shader"),
            source: wgpu::ShaderSource::Wgsl(SHADOW_SHADER_SOURCE.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("shadow-pipeline-layout"),
            bind_group_layouts: &[light_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("shadow-depth-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_shadow"),
                buffers: &[TERRAIN_VERTEX_LAYOUT],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Back faces go into the map; lit front faces never self-shadow.
                cull_mode: Some(wgpu::Face::Front),
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DepthBuffer::FORMAT,
                depth_write_enabled: true,
                depth_compare: DepthBuffer::COMPARE_FUNCTION,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 1.75,
                    clamp: 0.0,
                },
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: None,
            multiview_mask: None,
            cache: None,
        });

        Self { pipeline }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::create_test_device;
    use crate::camera::ViewProjUniform;

    #[test]
    fn test_shader_reads_position_only() {
        assert!(SHADOW_SHADER_SOURCE.contains("@location(0) position"));
        assert!(!SHADOW_SHADER_SOURCE.contains("@location(1)"));
        assert!(!SHADOW_SHADER_SOURCE.contains("@fragment"));
    }

    #[test]
    fn test_pipeline_creation() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let layout = ViewProjUniform::bind_group_layout(&device, "test-light-bgl");
        let _pipeline = ShadowPipeline::new(&device, &layout);
    }
}
