//! Multi-octave fractal Brownian motion (fBm) over 3D Perlin noise.
//!
//! Octaves are summed starting at frequency 1 and amplitude 1; each
//! successive octave multiplies frequency by `lacunarity` and amplitude by
//! `gain`. The sum is not normalized, so the output lies roughly in
//! `[-1, 1]` and is bounded by [`FbmNoise::max_amplitude`].

use noise::{NoiseFn, Perlin};

/// Parameters for one fBm evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoiseParameters {
    /// Permutation table seed.
    pub seed: u32,
    /// Spatial scale. Coordinates are multiplied by `1 / scale` before sampling.
    pub scale: f32,
    /// Frequency multiplier between successive octaves. Typically 2.0.
    pub lacunarity: f32,
    /// Amplitude multiplier between successive octaves, in `(0, 1)`.
    pub gain: f32,
    /// Number of octaves to sum. Zero is treated as one.
    pub octaves: u32,
}

impl Default for NoiseParameters {
    fn default() -> Self {
        Self {
            seed: 0,
            scale: 1.0,
            lacunarity: 2.0,
            gain: 0.5,
            octaves: 4,
        }
    }
}

/// fBm sampler over Perlin noise.
///
/// Holding the permutation table makes repeated sampling cheap; sampling
/// itself never mutates the sampler, so identical inputs always yield
/// identical outputs.
#[derive(Clone)]
pub struct FbmNoise {
    perlin: Perlin,
    params: NoiseParameters,
}

impl FbmNoise {
    /// Create a sampler for the given parameters.
    pub fn new(params: NoiseParameters) -> Self {
        Self {
            perlin: Perlin::new(params.seed),
            params,
        }
    }

    /// Sample the fBm field at `(x, y, z)`.
    pub fn sample(&self, x: f32, y: f32, z: f32) -> f32 {
        let inv_scale = 1.0 / f64::from(self.params.scale);
        let point = [
            f64::from(x) * inv_scale,
            f64::from(y) * inv_scale,
            f64::from(z) * inv_scale,
        ];

        let mut total = 0.0;
        let mut frequency = 1.0;
        let mut amplitude = 1.0;

        for _ in 0..self.params.octaves.max(1) {
            let noise_val = self.perlin.get([
                point[0] * frequency,
                point[1] * frequency,
                point[2] * frequency,
            ]);
            total += noise_val * amplitude;

            frequency *= f64::from(self.params.lacunarity);
            amplitude *= f64::from(self.params.gain);
        }

        total as f32
    }

    /// Sample at a [`glam::Vec3`] point.
    pub fn sample_vec(&self, point: glam::Vec3) -> f32 {
        self.sample(point.x, point.y, point.z)
    }

    /// Geometric bound on `|sample|`: the sum of all octave amplitudes.
    pub fn max_amplitude(&self) -> f32 {
        let mut sum = 0.0;
        let mut amp = 1.0;
        for _ in 0..self.params.octaves.max(1) {
            sum += amp;
            amp *= self.params.gain;
        }
        sum
    }

    /// Return a reference to the current parameters.
    pub fn params(&self) -> &NoiseParameters {
        &self.params
    }
}

impl std::fmt::Debug for FbmNoise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FbmNoise")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// One-shot fBm evaluation.
///
/// Builds the permutation table on every call; prefer [`FbmNoise`] when
/// sampling many points with the same parameters.
pub fn sample(x: f32, y: f32, z: f32, params: &NoiseParameters) -> f32 {
    FbmNoise::new(*params).sample(x, y, z)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(octaves: u32) -> NoiseParameters {
        NoiseParameters {
            seed: 42,
            scale: 1.0,
            lacunarity: 2.0,
            gain: 0.5,
            octaves,
        }
    }

    #[test]
    fn test_determinism_same_params_same_coord() {
        let a = FbmNoise::new(params(4));
        let b = FbmNoise::new(params(4));
        for i in 0..64 {
            let t = i as f32 * 0.173;
            let (x, y, z) = (t.sin() * 3.0, t.cos() * 2.0, t * 0.5);
            assert_eq!(a.sample(x, y, z).to_bits(), b.sample(x, y, z).to_bits());
        }
    }

    #[test]
    fn test_free_function_matches_sampler() {
        let p = params(3);
        let sampler = FbmNoise::new(p);
        assert_eq!(
            sample(0.3, 0.7, -1.2, &p).to_bits(),
            sampler.sample(0.3, 0.7, -1.2).to_bits()
        );
    }

    #[test]
    fn test_value_within_octave_bound() {
        let sampler = FbmNoise::new(params(6));
        let bound = sampler.max_amplitude();
        for i in 0..40 {
            for j in 0..40 {
                let x = i as f32 * 0.37;
                let y = j as f32 * 0.29;
                let v = sampler.sample(x, y, x - y);
                assert!(v.abs() <= bound + 1e-5, "sample {v} exceeds bound {bound}");
            }
        }
    }

    #[test]
    fn test_zero_octaves_is_single_evaluation() {
        let zero = FbmNoise::new(params(0));
        let one = FbmNoise::new(params(1));
        assert_eq!(zero.sample(1.3, 0.2, 0.9), one.sample(1.3, 0.2, 0.9));
        assert_eq!(zero.max_amplitude(), 1.0);
    }

    #[test]
    fn test_max_amplitude_calculation() {
        let sampler = FbmNoise::new(params(4));
        assert!((sampler.max_amplitude() - 1.875).abs() < 1e-6);
    }

    #[test]
    fn test_scale_stretches_field() {
        let unit = FbmNoise::new(params(4));
        let wide = FbmNoise::new(NoiseParameters {
            scale: 10.0,
            ..params(4)
        });
        let a = unit.sample(0.31, 0.47, 0.12);
        let b = wide.sample(3.1, 4.7, 1.2);
        assert!((a - b).abs() < 1e-5, "scaled coordinates should coincide: {a} vs {b}");
    }

    #[test]
    fn test_more_octaves_adds_detail() {
        let coarse = FbmNoise::new(params(1));
        let fine = FbmNoise::new(params(6));
        let step = 0.05;
        let mut diff_coarse = 0.0;
        let mut diff_fine = 0.0;

        for i in 0..1000 {
            let x = i as f32 * step + 0.013;
            diff_coarse += (coarse.sample(x + step, 0.3, 0.7) - coarse.sample(x, 0.3, 0.7)).abs();
            diff_fine += (fine.sample(x + step, 0.3, 0.7) - fine.sample(x, 0.3, 0.7)).abs();
        }

        assert!(
            diff_fine > diff_coarse,
            "6 octaves should vary more between neighbours than 1: {diff_fine} vs {diff_coarse}"
        );
    }

    #[test]
    fn test_smooth_no_discontinuities() {
        let sampler = FbmNoise::new(params(4));
        let step = 0.001;
        for i in 0..5000 {
            let x = i as f32 * step;
            let delta = (sampler.sample(x + step, 0.5, 0.25) - sampler.sample(x, 0.5, 0.25)).abs();
            assert!(delta < 0.1, "discontinuity at x={x}: delta={delta}");
        }
    }
}
