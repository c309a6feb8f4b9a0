//! Camera system for view and projection matrix generation.

use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Quat, Vec3};

/// A perspective camera that generates view and projection matrices for rendering.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    /// Rotation as a unit quaternion.
    pub rotation: Quat,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width / height.
    pub aspect_ratio: f32,
    /// Near clip plane distance (always positive).
    pub near: f32,
    /// Far clip plane distance (always positive, > near).
    pub far: f32,
}

impl Camera {
    /// Perspective camera at `eye` facing `target`.
    ///
    /// `up` must not be parallel to `target - eye`; the rotation falls back to
    /// identity when the basis is degenerate.
    pub fn look_at(
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        fov_y: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let rotation = (target - eye)
            .try_normalize()
            .and_then(|forward| {
                let right = forward.cross(up).try_normalize()?;
                let up = right.cross(forward);
                Some(Quat::from_mat3(&Mat3::from_cols(right, up, -forward)))
            })
            .unwrap_or(Quat::IDENTITY);

        Self {
            position: eye,
            rotation,
            fov_y,
            aspect_ratio,
            near,
            far,
        }
    }

    /// Compute the view matrix (inverse of camera transform).
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }

    /// Reverse-Z perspective: near and far swapped.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.far, self.near)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// A single view-projection matrix, shared by the camera and light uniforms.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ViewProjUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl ViewProjUniform {
    pub fn from_matrix(matrix: Mat4) -> Self {
        Self {
            view_proj: matrix.to_cols_array_2d(),
        }
    }

    /// Layout for a single vertex-stage `mat4x4<f32>` uniform at binding 0.
    pub fn bind_group_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<Self>() as u64),
                },
                count: None,
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_4;

    fn orbit_camera(eye: Vec3) -> Camera {
        Camera::look_at(eye, Vec3::ZERO, Vec3::Y, FRAC_PI_4, 1.5, 0.1, 500.0)
    }

    #[test]
    fn test_look_at_faces_target() {
        let eye = Vec3::new(70.0, 50.0, 0.0);
        let camera = orbit_camera(eye);
        let forward = camera.rotation * Vec3::NEG_Z;
        let expected = (-eye).normalize();
        assert!(
            (forward - expected).length() < 1e-5,
            "forward {forward} != {expected}"
        );
        assert!((camera.rotation * Vec3::Y).y > 0.0, "camera must stay upright");

        let ndc = camera.view_projection_matrix().project_point3(Vec3::ZERO);
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_look_at_degenerate_up_is_finite() {
        let camera = Camera::look_at(Vec3::Y * 10.0, Vec3::ZERO, Vec3::Y, FRAC_PI_4, 1.0, 0.1, 100.0);
        assert_eq!(camera.rotation, Quat::IDENTITY);
        assert!(camera.view_projection_matrix().is_finite());
    }

    #[test]
    fn test_wide_aspect_squeezes_x() {
        let mut camera = orbit_camera(Vec3::new(0.0, 0.0, 50.0));
        let point = Vec3::new(5.0, 5.0, 0.0);
        camera.aspect_ratio = 1.0;
        let square = camera.view_projection_matrix().project_point3(point);
        camera.aspect_ratio = 2.0;
        let wide = camera.view_projection_matrix().project_point3(point);
        assert!((wide.x - square.x * 0.5).abs() < 1e-5);
        assert!((wide.y - square.y).abs() < 1e-5);
    }

    #[test]
    fn test_reverse_z_near_is_deeper_than_far() {
        let camera = orbit_camera(Vec3::new(0.0, 0.0, 50.0));
        let proj = camera.projection_matrix();
        let near = proj.project_point3(Vec3::new(0.0, 0.0, -1.0));
        let far = proj.project_point3(Vec3::new(0.0, 0.0, -400.0));
        assert!(near.z > far.z, "reverse-Z: {} should exceed {}", near.z, far.z);
    }

    #[test]
    fn test_uniform_matches_matrix() {
        let camera = orbit_camera(Vec3::new(0.0, 5.0, 20.0));
        let matrix = camera.view_projection_matrix();
        let uniform = ViewProjUniform::from_matrix(matrix);
        assert_eq!(uniform.view_proj, matrix.to_cols_array_2d());
        assert_eq!(std::mem::size_of::<ViewProjUniform>(), 64);
    }
}
