//! Sphere terrain meshing: UV-sphere topology, noise displacement, and the
//! immediate-mode rotation walk used as a reference for the sampling math.

pub mod sphere;
pub mod vertex;
pub mod walk;

pub use sphere::{
    Mesh, MeshStats, NormalMode, TerrainGenerator, TopologyError, TopologyParameters, generate,
};
pub use vertex::{TERRAIN_VERTEX_ATTRIBUTES, TERRAIN_VERTEX_LAYOUT, TerrainVertex};
pub use walk::{RotationWalk, WalkTriangle};
