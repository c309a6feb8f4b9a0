//! Per-frame orchestration state: elapsed time, surface size and the
//! scripted orbit camera.

use glam::Vec3;
use terragen_config::CameraConfig;
use terragen_mesh::MeshStats;
use terragen_render::Camera;
use tracing::warn;

/// Maximum frame time clamp. A stalled frame advances the scene by at most this much.
pub const MAX_FRAME_TIME: f32 = 0.25;

const CAMERA_NEAR: f32 = 0.1;
const CAMERA_FAR: f32 = 1000.0;

/// Mutable state carried from one frame to the next.
#[derive(Clone, Debug)]
pub struct FrameState {
    pub width: u32,
    pub height: u32,
    /// Seconds of scene time elapsed.
    pub time: f32,
    pub frame_count: u64,
    pub show_stats: bool,
    camera: CameraConfig,
}

impl FrameState {
    pub fn new(width: u32, height: u32, camera: CameraConfig, show_stats: bool) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            time: 0.0,
            frame_count: 0,
            show_stats,
            camera,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }

    /// Advance scene time by the wall-clock `dt`, clamped to [`MAX_FRAME_TIME`].
    /// Returns the step actually taken.
    pub fn advance(&mut self, dt: f32) -> f32 {
        let step = if dt > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                dt * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            MAX_FRAME_TIME
        } else {
            dt.max(0.0)
        };
        self.time += step;
        self.frame_count += 1;
        step
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Camera position on its orbit around the Y axis at the current time.
    pub fn camera_eye(&self) -> Vec3 {
        let angle = self.camera.orbit_speed * self.time;
        Vec3::new(
            angle.cos() * self.camera.distance,
            self.camera.height,
            angle.sin() * self.camera.distance,
        )
    }

    /// The orbit camera, looking at the planet centre.
    pub fn camera(&self) -> Camera {
        Camera::look_at(
            self.camera_eye(),
            Vec3::ZERO,
            Vec3::Y,
            self.camera.fov_y_degrees.to_radians(),
            self.aspect_ratio(),
            CAMERA_NEAR,
            CAMERA_FAR,
        )
    }

    /// Window title: `base` alone, or with mesh statistics and live parameters.
    pub fn title(&self, base: &str, stats: &MeshStats, summary: &str, shadowed: bool) -> String {
        if !self.show_stats {
            return base.to_string();
        }
        format!(
            "{base} | {stats} | {summary} | shadows {} | t={:.1}s",
            if shadowed { "on" } else { "off" },
            self.time
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> FrameState {
        FrameState::new(1000, 800, CameraConfig::default(), true)
    }

    #[test]
    fn test_advance_accumulates_time() {
        let mut frame = state();
        frame.advance(0.1);
        frame.advance(0.05);
        assert!((frame.time - 0.15).abs() < 1e-6);
        assert_eq!(frame.frame_count, 2);
    }

    #[test]
    fn test_advance_clamps_long_frames() {
        let mut frame = state();
        let step = frame.advance(3.0);
        assert_eq!(step, MAX_FRAME_TIME);
        assert_eq!(frame.time, MAX_FRAME_TIME);
    }

    #[test]
    fn test_advance_ignores_negative_dt() {
        let mut frame = state();
        frame.advance(-1.0);
        assert_eq!(frame.time, 0.0);
    }

    #[test]
    fn test_resize_never_zero() {
        let mut frame = state();
        frame.resize(0, 0);
        assert_eq!((frame.width, frame.height), (1, 1));
        assert!(frame.aspect_ratio().is_finite());
    }

    #[test]
    fn test_camera_orbits_at_fixed_distance() {
        let mut frame = state();
        let config = CameraConfig::default();
        for _ in 0..20 {
            frame.advance(0.2);
            let eye = frame.camera_eye();
            assert!((eye.y - config.height).abs() < 1e-5);
            assert!((Vec3::new(eye.x, 0.0, eye.z).length() - config.distance).abs() < 1e-3);
        }
    }

    #[test]
    fn test_camera_sees_planet_centre() {
        let mut frame = state();
        frame.advance(0.2);
        let ndc = frame
            .camera()
            .view_projection_matrix()
            .project_point3(Vec3::ZERO);
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_title_with_and_without_stats() {
        let stats = MeshStats {
            vertex_count: 15,
            triangle_count: 8,
        };
        let mut frame = state();
        let title = frame.title("terragen", &stats, "4x2", true);
        assert!(title.starts_with("terragen | 15 vertices, 8 triangles | 4x2"));
        assert!(title.contains("shadows on"));

        frame.show_stats = false;
        assert_eq!(frame.title("terragen", &stats, "4x2", false), "terragen");
    }
}
