//! GPU-resident copy of a generated terrain mesh.

use terragen_mesh::{Mesh, MeshStats, TerrainVertex};

use crate::buffer::{BufferAllocator, MeshBuffer};
use crate::error::RenderError;

/// A terrain [`Mesh`] uploaded once into vertex and index buffers.
///
/// The CPU copy is kept for diagnostics. Both are immutable after upload and
/// drop together.
pub struct MeshResource {
    mesh: Mesh,
    buffer: MeshBuffer,
}

impl MeshResource {
    /// Upload `mesh`, refusing empty meshes and buffers over the device limit.
    pub fn upload(device: &wgpu::Device, mesh: Mesh) -> Result<Self, RenderError> {
        check_buffer_sizes(&mesh, device.limits().max_buffer_size)?;

        let buffer =
            BufferAllocator::new(device).create_mesh("terrain", &mesh.vertices, &mesh.indices);
        log::info!("Uploaded terrain mesh: {}", mesh.stats());

        Ok(Self { mesh, buffer })
    }

    pub fn stats(&self) -> MeshStats {
        self.mesh.stats()
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn buffer(&self) -> &MeshBuffer {
        &self.buffer
    }
}

/// Validate vertex and index byte sizes against `limit` before any allocation.
fn check_buffer_sizes(mesh: &Mesh, limit: u64) -> Result<(), RenderError> {
    if mesh.is_empty() {
        return Err(RenderError::EmptyMesh);
    }
    if u32::try_from(mesh.indices.len()).is_err() {
        return Err(RenderError::BufferTooLarge {
            kind: "index",
            size: (mesh.indices.len() * std::mem::size_of::<u32>()) as u64,
            limit,
        });
    }

    let buffers = [
        ("vertex", mesh.vertices.len() * std::mem::size_of::<TerrainVertex>()),
        ("index", mesh.indices.len() * std::mem::size_of::<u32>()),
    ];
    for (kind, size) in buffers {
        let size = size as u64;
        if size > limit {
            return Err(RenderError::BufferTooLarge { kind, size, limit });
        }
    }
    Ok(())
}
