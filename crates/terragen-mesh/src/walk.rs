//! Immediate-mode sphere walk.
//!
//! Produces the same displaced, classified surface as
//! [`TerrainGenerator`](crate::TerrainGenerator) without building vertex or
//! index buffers: a working quad starts at the north pole and is rotated
//! about Y across every slice, then its lower edge is rotated about Z to
//! start the next band. Everything is recomputed on each call. Poles are not
//! collapsed, so the first and last bands contain degenerate triangles.

use std::f32::consts::{PI, TAU};

use glam::{Mat3, Vec3};
use terragen_terrain::{Classifier, DisplacementSource, Rgba8};

/// One emitted triangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WalkTriangle {
    /// Displaced positions, counter-clockwise seen from outside.
    pub positions: [Vec3; 3],
    pub colors: [Rgba8; 3],
}

impl WalkTriangle {
    pub fn area(&self) -> f32 {
        let [a, b, c] = self.positions;
        (b - a).cross(c - a).length() * 0.5
    }
}

/// Ring/slice walk over a displaced sphere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotationWalk {
    /// Interior latitude rings. The walk covers `rings + 1` bands.
    pub rings: u32,
    pub slices: u32,
    pub radius: f32,
    pub relief: f32,
}

impl RotationWalk {
    pub fn new(rings: u32, slices: u32) -> Self {
        Self {
            rings,
            slices,
            radius: 1.0,
            relief: 1.0,
        }
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_relief(mut self, relief: f32) -> Self {
        self.relief = relief;
        self
    }

    /// `(rings + 1) * slices * 2`.
    pub fn triangle_count(&self) -> usize {
        (self.rings as usize + 1) * self.slices as usize * 2
    }

    /// Walk the sphere, handing each triangle to `emit`.
    pub fn walk<D, C, F>(&self, displacement: &D, classifier: &C, mut emit: F)
    where
        D: DisplacementSource,
        C: Classifier,
        F: FnMut(WalkTriangle),
    {
        if self.slices == 0 {
            return;
        }

        let ring_angle = PI / (self.rings + 1) as f32;
        let slice_angle = TAU / self.slices as f32;
        let about_y = Mat3::from_rotation_y(-slice_angle);
        let about_z = Mat3::from_rotation_z(-ring_angle);

        let vertex = |dir: Vec3| {
            let base = dir * self.radius;
            let h = displacement.displacement(base);
            (base + dir * (h * self.relief), classifier.color(h))
        };

        let mut v2 = Vec3::Y;
        let mut v3 = Vec3::new(ring_angle.sin(), ring_angle.cos(), 0.0);

        for _ in 0..=self.rings {
            for _ in 0..self.slices {
                let v0 = v2;
                let v1 = v3;
                v2 = about_y * v2;
                v3 = about_y * v3;

                let (p0, c0) = vertex(v0);
                let (p1, c1) = vertex(v1);
                let (p2, c2) = vertex(v2);
                let (p3, c3) = vertex(v3);

                emit(WalkTriangle {
                    positions: [p0, p3, p1],
                    colors: [c0, c3, c1],
                });
                emit(WalkTriangle {
                    positions: [p0, p2, p3],
                    colors: [c0, c2, c3],
                });
            }

            v2 = v3;
            v3 = about_z * v3;
        }
    }

    /// Collect the walk into a vector.
    pub fn triangles<D, C>(&self, displacement: &D, classifier: &C) -> Vec<WalkTriangle>
    where
        D: DisplacementSource,
        C: Classifier,
    {
        let mut out = Vec::with_capacity(self.triangle_count());
        self.walk(displacement, classifier, |tri| out.push(tri));
        out
    }
}
