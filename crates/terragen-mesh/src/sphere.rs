//! UV-sphere generation with per-vertex noise displacement.
//!
//! Rows run from the north pole (`i = 0`) to the south pole (`i = lat`);
//! columns run once around the Y axis with the seam column duplicated, so the
//! grid holds `(lon + 1) * (lat + 1)` vertices. Triangles are wound
//! counter-clockwise as seen from outside the sphere. The first and last rows
//! skip the cell triangle that would collapse onto the pole.

use std::f32::consts::{FRAC_PI_2, PI, TAU};
use std::fmt;

use glam::Vec3;
use terragen_terrain::{
    BiomeLadder, Classifier, DisplacementSource, FbmDisplacement, HeightRange, NoiseParameters,
};

use crate::vertex::TerrainVertex;

/// Errors returned when topology parameters cannot produce a mesh.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TopologyError {
    #[error("longitude_slices must be at least {min}, got {got}")]
    TooFewLongitudeSlices { got: u32, min: u32 },

    #[error("latitude_slices must be at least {min}, got {got}")]
    TooFewLatitudeSlices { got: u32, min: u32 },

    #[error("base radius must be finite and positive, got {0}")]
    InvalidRadius(f32),

    #[error("{0} vertices do not fit 32-bit indices")]
    TooManyVertices(u64),
}

/// Sphere resolution and size. Determines vertex and triangle counts alone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TopologyParameters {
    /// Number of meridian slices around the Y axis.
    pub longitude_slices: u32,
    /// Number of bands from pole to pole.
    pub latitude_slices: u32,
    /// Radius of the undisplaced sphere.
    pub base_radius: f32,
}

impl TopologyParameters {
    pub const MIN_LONGITUDE_SLICES: u32 = 3;
    pub const MIN_LATITUDE_SLICES: u32 = 2;

    pub fn new(longitude_slices: u32, latitude_slices: u32, base_radius: f32) -> Self {
        Self {
            longitude_slices,
            latitude_slices,
            base_radius,
        }
    }

    /// Check every precondition of [`TerrainGenerator::generate`].
    pub fn validate(&self) -> Result<(), TopologyError> {
        if self.longitude_slices < Self::MIN_LONGITUDE_SLICES {
            return Err(TopologyError::TooFewLongitudeSlices {
                got: self.longitude_slices,
                min: Self::MIN_LONGITUDE_SLICES,
            });
        }
        if self.latitude_slices < Self::MIN_LATITUDE_SLICES {
            return Err(TopologyError::TooFewLatitudeSlices {
                got: self.latitude_slices,
                min: Self::MIN_LATITUDE_SLICES,
            });
        }
        if !self.base_radius.is_finite() || self.base_radius <= 0.0 {
            return Err(TopologyError::InvalidRadius(self.base_radius));
        }
        let count = self.vertex_count();
        if count > u64::from(u32::MAX) {
            return Err(TopologyError::TooManyVertices(count));
        }
        Ok(())
    }

    /// `(lon + 1) * (lat + 1)`, saturating.
    pub fn vertex_count(&self) -> u64 {
        (u64::from(self.longitude_slices) + 1).saturating_mul(u64::from(self.latitude_slices) + 1)
    }

    /// `lon * (lat - 1) * 2`.
    pub fn triangle_count(&self) -> u64 {
        u64::from(self.longitude_slices)
            .saturating_mul(u64::from(self.latitude_slices.saturating_sub(1)))
            .saturating_mul(2)
    }
}

impl Default for TopologyParameters {
    fn default() -> Self {
        Self::new(100, 100, 10.0)
    }
}

/// How vertex normals are derived.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NormalMode {
    /// The undisplaced radial direction.
    #[default]
    Radial,
    /// Area-weighted face normals of the displaced surface, welded across
    /// the seam and the poles.
    Recomputed,
}

/// Indexed triangle mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<TerrainVertex>,
    /// Three indices per triangle.
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    pub fn stats(&self) -> MeshStats {
        MeshStats {
            vertex_count: self.vertices.len(),
            triangle_count: self.triangle_count(),
        }
    }
}

/// Read-only diagnostics for a generated mesh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MeshStats {
    pub vertex_count: usize,
    pub triangle_count: usize,
}

impl fmt::Display for MeshStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} vertices, {} triangles",
            self.vertex_count, self.triangle_count
        )
    }
}

/// Builds a displaced, classified UV sphere.
#[derive(Clone, Debug)]
pub struct TerrainGenerator<D = FbmDisplacement, C = BiomeLadder> {
    pub topology: TopologyParameters,
    /// World units of radial offset per unit of displacement.
    pub relief: f32,
    pub normals: NormalMode,
    pub displacement: D,
    pub classifier: C,
}

impl<D: DisplacementSource, C: Classifier> TerrainGenerator<D, C> {
    /// Generator with unit relief and radial normals.
    pub fn new(topology: TopologyParameters, displacement: D, classifier: C) -> Self {
        Self {
            topology,
            relief: 1.0,
            normals: NormalMode::Radial,
            displacement,
            classifier,
        }
    }

    pub fn with_relief(mut self, relief: f32) -> Self {
        self.relief = relief;
        self
    }

    pub fn with_normals(mut self, normals: NormalMode) -> Self {
        self.normals = normals;
        self
    }

    /// Generate the mesh.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError`] when the topology is invalid. Nothing is
    /// allocated in that case.
    pub fn generate(&self) -> Result<Mesh, TopologyError> {
        self.topology.validate()?;

        let lon = self.topology.longitude_slices as usize;
        let lat = self.topology.latitude_slices as usize;
        let radius = self.topology.base_radius;
        let stride = lon + 1;

        let lat_step = PI / lat as f32;
        let lon_step = TAU / lon as f32;

        let mut vertices = Vec::with_capacity(stride * (lat + 1));
        for i in 0..=lat {
            let (sin_phi, cos_phi) = (FRAC_PI_2 - i as f32 * lat_step).sin_cos();
            for j in 0..=lon {
                let (sin_theta, cos_theta) = (j as f32 * lon_step).sin_cos();
                let dir = Vec3::new(cos_phi * sin_theta, sin_phi, cos_phi * cos_theta);

                let base = dir * radius;
                let h = self.displacement.displacement(base);
                let position = base + dir * (h * self.relief);
                let color = self.classifier.color(h);

                vertices.push(TerrainVertex::new(position, dir, color.to_array()));
            }
        }

        let indices = sphere_indices(lon, lat);

        let mut mesh = Mesh { vertices, indices };
        if self.normals == NormalMode::Recomputed {
            recompute_normals(&mut mesh, lon, lat);
        }
        Ok(mesh)
    }
}

/// Generate a sphere displaced by fBm noise in the default height range,
/// colored by the default biome ladder.
pub fn generate(topology: TopologyParameters, noise: &NoiseParameters) -> Result<Mesh, TopologyError> {
    TerrainGenerator::new(
        topology,
        FbmDisplacement::new(*noise, HeightRange::default()),
        BiomeLadder::default(),
    )
    .generate()
}

fn sphere_indices(lon: usize, lat: usize) -> Vec<u32> {
    let stride = lon + 1;
    let mut indices = Vec::with_capacity(lon * (lat - 1) * 6);

    for i in 0..lat {
        let mut k1 = (i * stride) as u32;
        let mut k2 = k1 + stride as u32;

        for _ in 0..lon {
            if i != 0 {
                indices.extend_from_slice(&[k1, k2, k1 + 1]);
            }
            if i != lat - 1 {
                indices.extend_from_slice(&[k1 + 1, k2, k2 + 1]);
            }
            k1 += 1;
            k2 += 1;
        }
    }

    indices
}

fn recompute_normals(mesh: &mut Mesh, lon: usize, lat: usize) {
    let stride = lon + 1;
    let mut acc = vec![Vec3::ZERO; mesh.vertices.len()];

    for [a, b, c] in mesh.triangles() {
        let pa = mesh.vertices[a as usize].position();
        let pb = mesh.vertices[b as usize].position();
        let pc = mesh.vertices[c as usize].position();
        let face = (pb - pa).cross(pc - pa);
        acc[a as usize] += face;
        acc[b as usize] += face;
        acc[c as usize] += face;
    }

    // Seam columns are the same surface point.
    for i in 0..=lat {
        let row = i * stride;
        let welded = acc[row] + acc[row + lon];
        acc[row] = welded;
        acc[row + lon] = welded;
    }

    // Every vertex of a pole row is the same surface point.
    for row in [0, lat * stride] {
        let welded: Vec3 = acc[row..row + lon].iter().sum();
        acc[row..row + stride].fill(welded);
    }

    for (vertex, sum) in mesh.vertices.iter_mut().zip(acc) {
        let n = sum.normalize_or_zero();
        if n != Vec3::ZERO {
            vertex.normal = n.to_array();
        }
    }
}
