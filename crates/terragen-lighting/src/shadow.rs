//! Single directional shadow map: light-space transform and lighting uniform.
//!
//! The light camera is orthographic, placed `light_distance` units back
//! along the light direction from the origin and looking at it. Projection
//! uses reverse-Z (near maps to depth 1, far to depth 0), matching the main
//! depth buffer and the `GreaterEqual` comparison sampler.

use bytemuck::{Pod, Zeroable};

use crate::DirectionalLight;

/// Configuration for the directional shadow map.
#[derive(Clone, Debug, PartialEq)]
pub struct ShadowConfig {
    /// Shadow map resolution (width = height). Default: 1024.
    pub resolution: u32,
    /// Distance from the origin to the light camera.
    pub light_distance: f32,
    /// Half width and half height of the orthographic volume.
    pub ortho_half_extent: f32,
    /// Light camera near plane.
    pub near: f32,
    /// Light camera far plane.
    pub far: f32,
    /// Depth offset applied toward the light before the shadow comparison, in NDC depth.
    pub depth_bias: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            resolution: 1024,
            light_distance: 40.0,
            ortho_half_extent: 20.0,
            near: 0.1,
            far: 100.0,
            depth_bias: 0.002,
        }
    }
}

/// View and projection of the light camera for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightTransform {
    pub view: glam::Mat4,
    pub projection: glam::Mat4,
}

impl LightTransform {
    pub fn view_projection(&self) -> glam::Mat4 {
        self.projection * self.view
    }
}

/// Compute the light camera for a light travelling along `light_dir`.
pub fn compute_light_transform(light_dir: glam::Vec3, config: &ShadowConfig) -> LightTransform {
    let dir = light_dir.try_normalize().unwrap_or(glam::Vec3::NEG_Y);
    let eye = -dir * config.light_distance;
    let up = if dir.y.abs() > 0.99 {
        glam::Vec3::Z
    } else {
        glam::Vec3::Y
    };
    let view = glam::Mat4::look_at_rh(eye, glam::Vec3::ZERO, up);

    let h = config.ortho_half_extent;
    // Reverse-Z: swap near/far.
    let projection = glam::Mat4::orthographic_rh(-h, h, -h, h, config.far, config.near);

    LightTransform { view, projection }
}

/// GPU-side lighting uniform shared by the depth and lit passes.
///
/// Total size: 64 + 3×16 = 112 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct LightingUniform {
    /// Light-space view-projection matrix.
    pub light_view_proj: [f32; 16],
    /// xyz = direction (normalized, from the light), w = intensity.
    pub direction_intensity: [f32; 4],
    /// xyz = color (linear RGB), w = padding.
    pub color_padding: [f32; 4],
    /// xyz = ambient (linear RGB), w = shadow depth bias.
    pub ambient_bias: [f32; 4],
}

impl LightingUniform {
    pub fn new(
        transform: &LightTransform,
        light: &DirectionalLight,
        ambient: glam::Vec3,
        depth_bias: f32,
    ) -> Self {
        Self {
            light_view_proj: transform.view_projection().to_cols_array(),
            direction_intensity: [
                light.direction.x,
                light.direction.y,
                light.direction.z,
                light.intensity,
            ],
            color_padding: [light.color.x, light.color.y, light.color.z, 0.0],
            ambient_bias: [ambient.x, ambient.y, ambient.z, depth_bias],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(transform: &LightTransform, p: glam::Vec3) -> glam::Vec3 {
        transform.view_projection().project_point3(p)
    }

    fn sphere_points(radius: f32) -> Vec<glam::Vec3> {
        let mut points = Vec::new();
        for i in 0..=12 {
            let phi = std::f32::consts::PI * i as f32 / 12.0;
            for j in 0..24 {
                let theta = std::f32::consts::TAU * j as f32 / 24.0;
                points.push(
                    glam::Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin())
                        * radius,
                );
            }
        }
        points
    }

    #[test]
    fn test_lighting_uniform_size() {
        assert_eq!(std::mem::size_of::<LightingUniform>(), 112);
        assert_eq!(std::mem::offset_of!(LightingUniform, direction_intensity), 64);
        assert_eq!(std::mem::offset_of!(LightingUniform, ambient_bias), 96);
    }

    #[test]
    fn test_origin_maps_to_ortho_centre() {
        let config = ShadowConfig::default();
        for dir in [
            glam::Vec3::new(0.35, -1.0, -0.35),
            glam::Vec3::NEG_Y,
            glam::Vec3::X,
            glam::Vec3::new(-0.2, 0.4, 0.9),
        ] {
            let ndc = project(&compute_light_transform(dir, &config), glam::Vec3::ZERO);
            assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5, "{dir}: {ndc}");
            assert!(ndc.z > 0.0 && ndc.z < 1.0);
        }
    }

    #[test]
    fn test_planet_inside_clip_volume() {
        let config = ShadowConfig::default();
        let transform = compute_light_transform(glam::Vec3::new(0.35, -1.0, -0.35), &config);
        for p in sphere_points(15.0) {
            let ndc = project(&transform, p);
            assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0, "{p} -> {ndc}");
            assert!((0.0..=1.0).contains(&ndc.z), "{p} depth {}", ndc.z);
        }
    }

    #[test]
    fn test_reverse_z_closer_to_light_is_deeper() {
        let config = ShadowConfig::default();
        let dir = glam::Vec3::NEG_Y;
        let transform = compute_light_transform(dir, &config);
        // The light sits above the planet, so +Y is closer to it.
        let near = project(&transform, glam::Vec3::new(0.0, 10.0, 0.0));
        let far = project(&transform, glam::Vec3::new(0.0, -10.0, 0.0));
        assert!(near.z > far.z, "reverse-Z: {} should exceed {}", near.z, far.z);
    }

    #[test]
    fn test_light_matrix_is_finite() {
        let config = ShadowConfig::default();
        for dir in [glam::Vec3::NEG_Y, glam::Vec3::Y, glam::Vec3::ZERO] {
            let matrix = compute_light_transform(dir, &config).view_projection();
            for col in 0..4 {
                for row in 0..4 {
                    let val = matrix.col(col)[row];
                    assert!(
                        val.is_finite(),
                        "light matrix element [{col}][{row}] is not finite: {val}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_uniform_packs_light() {
        let light = DirectionalLight {
            direction: glam::Vec3::NEG_Y,
            color: glam::Vec3::new(1.0, 0.5, 0.25),
            intensity: 2.0,
        };
        let transform = compute_light_transform(light.direction, &ShadowConfig::default());
        let u = LightingUniform::new(&transform, &light, glam::Vec3::splat(0.1), 0.002);
        assert_eq!(u.light_view_proj, transform.view_projection().to_cols_array());
        assert_eq!(u.direction_intensity, [0.0, -1.0, 0.0, 2.0]);
        assert_eq!(u.color_padding, [1.0, 0.5, 0.25, 0.0]);
        assert_eq!(u.ambient_bias[3], 0.002);
    }
}
