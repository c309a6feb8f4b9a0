//! Lit terrain pipeline: Lambert diffuse from the directional light plus a
//! flat ambient term, optionally attenuated by the shadow map.
//!
//! Bind groups: camera view-projection at `@group(0)`, [`LightingUniform`]
//! at `@group(1)`, and (shadowed variant only) the shadow depth texture and
//! comparison sampler at `@group(2)`.

use std::num::NonZeroU64;

use terragen_lighting::LightingUniform;
use terragen_mesh::TERRAIN_VERTEX_LAYOUT;

use crate::camera::ViewProjUniform;
use crate::depth::DepthBuffer;

/// Bind group layouts shared by the shadowed and unshadowed lit pipelines.
pub struct LitBindGroupLayouts {
    /// Camera view-projection (group 0). Also fits the shadow pipeline's light matrix.
    pub view_proj: wgpu::BindGroupLayout,
    /// Lighting uniform (group 1).
    pub lighting: wgpu::BindGroupLayout,
    /// Shadow depth texture and comparison sampler (group 2).
    pub shadow_map: wgpu::BindGroupLayout,
}

impl LitBindGroupLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            view_proj: ViewProjUniform::bind_group_layout(device, "view-proj-bgl"),
            lighting: create_lighting_bind_group_layout(device),
            shadow_map: create_shadow_map_bind_group_layout(device),
        }
    }
}

fn create_lighting_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("lit-lighting-bgl"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: NonZeroU64::new(std::mem::size_of::<LightingUniform>() as u64),
            },
            count: None,
        }],
    })
}

/// Layout for the shadow map: depth texture at binding 0, comparison sampler at binding 1.
pub fn create_shadow_map_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("lit-shadow-map-bgl"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Depth,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                count: None,
            },
        ],
    })
}

/// Lit rendering pipeline for the terrain surface.
pub struct LitPipeline {
    pub pipeline: wgpu::RenderPipeline,
    shadowed: bool,
}

impl LitPipeline {
    /// Create the lit pipeline. The `shadowed` variant adds group 2 and
    /// samples the shadow map; the other variant treats every fragment as lit.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        layouts: &LitBindGroupLayouts,
        shadowed: bool,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(if shadowed {
                "lit-shadowed-shader"
            } else {
                "lit-unshadowed-shader"
            }),
            source: wgpu::ShaderSource::Wgsl(lit_shader_source(shadowed).into()),
        });

        let mut bind_group_layouts = vec![&layouts.view_proj, &layouts.lighting];
        if shadowed {
            bind_group_layouts.push(&layouts.shadow_map);
        }

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lit-pipeline-layout"),
            bind_group_layouts: &bind_group_layouts,
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("lit-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[TERRAIN_VERTEX_LAYOUT],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DepthBuffer::FORMAT,
                depth_write_enabled: true,
                depth_compare: DepthBuffer::COMPARE_FUNCTION,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        Self { pipeline, shadowed }
    }

    pub fn is_shadowed(&self) -> bool {
        self.shadowed
    }
}

const LIT_SHADER_COMMON: &str = r#"
struct ViewProj {
    view_proj: mat4x4<f32>,
};

struct Lighting {
    light_view_proj: mat4x4<f32>,
    direction_intensity: vec4<f32>,
    color_padding: vec4<f32>,
    ambient_bias: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> camera: ViewProj;

@group(1) @binding(0)
var<uniform> lighting: Lighting;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec4<f32>,
};

fn srgb_to_linear(c: vec3<f32>) -> vec3<f32> {
    let low = c / 12.92;
    let high = pow((c + vec3<f32>(0.055)) / 1.055, vec3<f32>(2.4));
    return select(high, low, c <= vec3<f32>(0.04045));
}

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = camera.view_proj * vec4<f32>(in.position, 1.0);
    out.world_position = in.position;
    out.normal = in.normal;
    out.color = in.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let normal = normalize(in.normal);
    let to_light = -normalize(lighting.direction_intensity.xyz);
    let n_dot_l = max(dot(normal, to_light), 0.0);

    let albedo = srgb_to_linear(in.color.rgb);
    let radiance = lighting.color_padding.xyz * lighting.direction_intensity.w;
    let shadow = shadow_factor(in.world_position);

    let color = albedo * (lighting.ambient_bias.xyz + radiance * n_dot_l * shadow);
    return vec4<f32>(color, 1.0);
}
"#;

const LIT_SHADER_SHADOWED: &str = r#"
@group(2) @binding(0)
var shadow_map: texture_depth_2d;

@group(2) @binding(1)
var shadow_sampler: sampler_comparison;

fn shadow_factor(world_position: vec3<f32>) -> f32 {
    let light_pos = lighting.light_view_proj * vec4<f32>(world_position, 1.0);
    let shadow_coord = light_pos.xyz / light_pos.w;
    let uv = vec2<f32>(shadow_coord.x * 0.5 + 0.5, -shadow_coord.y * 0.5 + 0.5);

    if uv.x < 0.0 || uv.x > 1.0 || uv.y < 0.0 || uv.y > 1.0 {
        return 1.0;
    }
    if shadow_coord.z < 0.0 || shadow_coord.z > 1.0 {
        return 1.0;
    }

    // Reverse-Z: the bias moves the receiver toward the light.
    return textureSampleCompareLevel(
        shadow_map,
        shadow_sampler,
        uv,
        shadow_coord.z + lighting.ambient_bias.w,
    );
}
"#;

const LIT_SHADER_UNSHADOWED: &str = r#"
fn shadow_factor(world_position: vec3<f32>) -> f32 {
    return 1.0;
}
"#;

/// WGSL source for the lit pipeline, with or without shadow sampling.
pub fn lit_shader_source(shadowed: bool) -> String {
    let shadow = if shadowed {
        LIT_SHADER_SHADOWED
    } else {
        LIT_SHADER_UNSHADOWED
    };
    format!("{LIT_SHADER_COMMON}{shadow}")
}
