//! Terrain vertex format and its canonical `wgpu::VertexBufferLayout`.
//!
//! Both the depth-only shadow pipeline and the lit pipeline reference
//! [`TERRAIN_VERTEX_LAYOUT`] so their inputs never drift apart.
//!
//! | Location | Offset | Format    | Field     |
//! |----------|--------|-----------|-----------|
//! | 0        | 0      | Float32x3 | position  |
//! | 1        | 12     | Float32x3 | normal    |
//! | 2        | 24     | Unorm8x4  | color     |
//! | 3        | 28     | Float32x2 | tex_coord |

use std::mem;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use wgpu::{VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

/// One vertex of the displaced sphere.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    /// World-space position after displacement.
    pub position: [f32; 3],
    /// Unit surface normal.
    pub normal: [f32; 3],
    /// Biome color, RGBA8.
    pub color: [u8; 4],
    /// Unused by the generator; always zero.
    pub tex_coord: [f32; 2],
}

static_assertions::assert_eq_size!(TerrainVertex, [u8; 36]);

impl TerrainVertex {
    /// Build a vertex with zero texture coordinates.
    pub fn new(position: Vec3, normal: Vec3, color: [u8; 4]) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            color,
            tex_coord: [0.0; 2],
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn normal(&self) -> Vec3 {
        Vec3::from_array(self.normal)
    }
}

/// Vertex attributes for [`TerrainVertex`].
pub const TERRAIN_VERTEX_ATTRIBUTES: [VertexAttribute; 4] = [
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 0,
        shader_location: 0,
    },
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 12,
        shader_location: 1,
    },
    VertexAttribute {
        format: VertexFormat::Unorm8x4,
        offset: 24,
        shader_location: 2,
    },
    VertexAttribute {
        format: VertexFormat::Float32x2,
        offset: 28,
        shader_location: 3,
    },
];

/// The vertex buffer layout for every terrain pipeline.
pub const TERRAIN_VERTEX_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: mem::size_of::<TerrainVertex>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &TERRAIN_VERTEX_ATTRIBUTES,
};

const _: () = assert!(TERRAIN_VERTEX_ATTRIBUTES[1].offset == mem::offset_of!(TerrainVertex, normal) as u64);
const _: () = assert!(TERRAIN_VERTEX_ATTRIBUTES[2].offset == mem::offset_of!(TerrainVertex, color) as u64);
const _: () = assert!(TERRAIN_VERTEX_ATTRIBUTES[3].offset == mem::offset_of!(TerrainVertex, tex_coord) as u64);
const _: () = assert!(
    TERRAIN_VERTEX_ATTRIBUTES[3].offset + 8 <= mem::size_of::<TerrainVertex>() as u64,
    "Last attribute exceeds vertex stride"
);
