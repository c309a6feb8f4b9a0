//! GPU buffers for terrain geometry and per-frame uniforms.

use terragen_mesh::TerrainVertex;
use wgpu::util::DeviceExt;

/// Terrain indices are always 32-bit.
pub const INDEX_FORMAT: wgpu::IndexFormat = wgpu::IndexFormat::Uint32;

/// Vertex and index buffers for one indexed triangle list.
pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl MeshBuffer {
    /// Bind vertex slot 0 and the index buffer.
    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), INDEX_FORMAT);
    }

    /// Draw every index once, single instance.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Creates initialized buffers on one device.
pub struct BufferAllocator<'a> {
    device: &'a wgpu::Device,
}

impl<'a> BufferAllocator<'a> {
    pub fn new(device: &'a wgpu::Device) -> Self {
        Self { device }
    }

    /// Upload terrain vertices and `u32` indices. Buffers are labelled
    /// `{label}-vertices` and `{label}-indices`.
    ///
    /// The caller guarantees `indices.len()` fits `u32`.
    pub fn create_mesh(
        &self,
        label: &str,
        vertices: &[TerrainVertex],
        indices: &[u32],
    ) -> MeshBuffer {
        MeshBuffer {
            vertex_buffer: self.create(
                &format!("{label}-vertices"),
                bytemuck::cast_slice(vertices),
                wgpu::BufferUsages::VERTEX,
            ),
            index_buffer: self.create(
                &format!("{label}-indices"),
                bytemuck::cast_slice(indices),
                wgpu::BufferUsages::INDEX,
            ),
            index_count: indices.len() as u32,
        }
    }

    /// Uniform buffer holding `data`, rewritable with `Queue::write_buffer`.
    pub fn create_uniform_buffer(&self, label: &str, data: &[u8]) -> wgpu::Buffer {
        self.create(label, data, wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST)
    }

    fn create(&self, label: &str, contents: &[u8], usage: wgpu::BufferUsages) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage,
            })
    }
}

/// Headless device for GPU tests. `None` when the machine has no adapter.
#[cfg(test)]
pub(crate) fn create_test_device() -> Option<(wgpu::Device, wgpu::Queue)> {
    pollster::block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok()?;

        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("terragen-test-device"),
                ..Default::default()
            })
            .await
            .ok()
    })
}
