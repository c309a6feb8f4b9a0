//! Displacement sources: the scalar height field the sphere generator samples.

use glam::Vec3;

use crate::noise::{FbmNoise, NoiseParameters};

/// Produces a displacement scalar for a point on the undisplaced sphere.
///
/// Implementations must be pure: the same point always yields the same value.
pub trait DisplacementSource {
    /// Displacement at `point`.
    fn displacement(&self, point: Vec3) -> f32;
}

impl<F> DisplacementSource for F
where
    F: Fn(Vec3) -> f32,
{
    fn displacement(&self, point: Vec3) -> f32 {
        self(point)
    }
}

/// Linear remap of raw noise from `[-1, 1]` into `[low, high]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeightRange {
    /// Displacement produced by a noise value of -1.
    pub low: f32,
    /// Displacement produced by a noise value of +1.
    pub high: f32,
}

impl Default for HeightRange {
    fn default() -> Self {
        Self {
            low: 0.0,
            high: 0.5,
        }
    }
}

impl HeightRange {
    /// Map a raw noise value into this range. Values outside `[-1, 1]` extrapolate.
    pub fn apply(&self, raw: f32) -> f32 {
        remap(raw, -1.0, 1.0, self.low, self.high)
    }
}

/// Linearly map `value` from `[in_min, in_max]` to `[out_min, out_max]`.
pub fn remap(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    out_min + (value - in_min) * (out_max - out_min) / (in_max - in_min)
}

/// fBm noise remapped into a [`HeightRange`].
#[derive(Clone, Debug)]
pub struct FbmDisplacement {
    /// Underlying noise field.
    pub noise: FbmNoise,
    /// Output range of the remap.
    pub range: HeightRange,
}

impl FbmDisplacement {
    /// Build a displacement source from noise parameters and an output range.
    pub fn new(params: NoiseParameters, range: HeightRange) -> Self {
        Self {
            noise: FbmNoise::new(params),
            range,
        }
    }
}

impl DisplacementSource for FbmDisplacement {
    fn displacement(&self, point: Vec3) -> f32 {
        self.range.apply(self.noise.sample_vec(point))
    }
}
