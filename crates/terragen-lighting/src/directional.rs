//! Directional light: the single sun-like light that casts the planet's shadows.
//!
//! [`DirectionalLight`] holds the CPU-side light properties. [`LightOrbit`]
//! sweeps its direction around the planet's Y axis over time.

/// CPU-side directional light description.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectionalLight {
    /// Normalized direction vector pointing FROM the light (toward the surface).
    pub direction: glam::Vec3,
    /// Linear RGB color of the light (not premultiplied by intensity).
    pub color: glam::Vec3,
    /// Scalar intensity multiplier.
    pub intensity: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            // Off-vertical so the terminator crosses the visible hemisphere.
            direction: glam::Vec3::new(0.35, -1.0, -0.35).normalize(),
            // Warm white, approximating D65 daylight.
            color: glam::Vec3::new(1.0, 0.96, 0.90),
            intensity: 1.0,
        }
    }
}

impl DirectionalLight {
    /// Build a light, normalizing `direction`.
    ///
    /// Returns `None` if `direction` has near-zero length or is not finite.
    pub fn new(direction: glam::Vec3, color: glam::Vec3, intensity: f32) -> Option<Self> {
        let direction = direction.try_normalize()?;
        Some(Self {
            direction,
            color,
            intensity,
        })
    }
}

/// Rotates a base light direction about the Y axis at a fixed angular speed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightOrbit {
    /// Direction at `time == 0`.
    pub base_direction: glam::Vec3,
    /// Radians per second. Zero keeps the light fixed.
    pub speed: f32,
}

impl LightOrbit {
    pub fn new(base_direction: glam::Vec3, speed: f32) -> Self {
        Self {
            base_direction,
            speed,
        }
    }

    /// Orbit that never moves.
    pub fn fixed(direction: glam::Vec3) -> Self {
        Self::new(direction, 0.0)
    }

    /// Normalized light direction `time` seconds into the orbit.
    pub fn direction_at(&self, time: f32) -> glam::Vec3 {
        light_direction_at_time(
            self.base_direction,
            glam::Quat::from_rotation_y(self.speed * time),
        )
    }
}

/// Rotate a base light direction by `rotation`.
///
/// Returns a normalized direction vector.
pub fn light_direction_at_time(base_direction: glam::Vec3, rotation: glam::Quat) -> glam::Vec3 {
    (rotation * base_direction).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_is_normalized() {
        let light = DirectionalLight::default();
        let len = light.direction.length();
        assert!(
            (len - 1.0).abs() < 1e-6,
            "direction must be unit length, got {len}"
        );
    }

    #[test]
    fn test_new_rejects_zero_direction() {
        assert!(DirectionalLight::new(glam::Vec3::ZERO, glam::Vec3::ONE, 1.0).is_none());
        let light = DirectionalLight::new(glam::Vec3::new(0.0, -2.0, 0.0), glam::Vec3::ONE, 1.0);
        assert_eq!(light.map(|l| l.direction), Some(glam::Vec3::NEG_Y));
    }

    #[test]
    fn test_default_light_color_is_warm_white() {
        let light = DirectionalLight::default();
        assert!(light.color.x >= light.color.y, "R should be >= G");
        assert!(light.color.y >= light.color.z, "G should be >= B");
        assert!(light.intensity > 0.0 && light.intensity.is_finite());
    }

    #[test]
    fn test_direction_updates_with_rotation() {
        let base = glam::Vec3::new(1.0, -1.0, 0.0);
        let rotation = glam::Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let rotated = light_direction_at_time(base, rotation);
        // +X rotated a quarter turn about Y lands on -Z.
        let expected = glam::Vec3::new(0.0, -1.0, -1.0).normalize();
        assert!((rotated - expected).length() < 1e-5, "got {rotated}");
    }

    #[test]
    fn test_orbit_preserves_elevation() {
        let orbit = LightOrbit::new(glam::Vec3::new(0.35, -1.0, -0.35), 0.2);
        let start = orbit.direction_at(0.0);
        for step in 1..50 {
            let dir = orbit.direction_at(step as f32 * 0.7);
            assert!((dir.length() - 1.0).abs() < 1e-5);
            assert!((dir.y - start.y).abs() < 1e-5, "orbit must stay in its cone");
        }
    }

    #[test]
    fn test_fixed_orbit_does_not_move() {
        let orbit = LightOrbit::fixed(glam::Vec3::NEG_Y);
        assert_eq!(orbit.direction_at(0.0), orbit.direction_at(1000.0));
    }
}
