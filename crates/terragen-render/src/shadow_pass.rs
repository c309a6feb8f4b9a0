//! Two-phase directional shadow pass.
//!
//! Each frame the pass captures terrain depth from the light into its
//! [`ShadowTarget`](crate::ShadowTarget), then composites the lit terrain on
//! screen with that target bound. [`ShadowPass::capture`] returns a
//! [`ShadowCapture`] token that [`ShadowPass::composite`] consumes, so a
//! composite cannot be encoded without the capture of the same frame.
//!
//! If the shadow target cannot be allocated the pass keeps running without
//! one: capture records nothing and composite draws unshadowed.

use glam::{Mat4, Vec3};
use terragen_lighting::{
    DirectionalLight, LightOrbit, LightTransform, LightingUniform, ShadowConfig,
    compute_light_transform,
};

use crate::backend::{Material, PassTarget, RenderBackend, ShadowTargetAllocator};

/// Proof that the depth capture for a frame has been encoded.
#[must_use = "pass the capture to ShadowPass::composite"]
#[derive(Debug)]
pub struct ShadowCapture {
    transform: LightTransform,
    lighting: LightingUniform,
    shadowed: bool,
}

impl ShadowCapture {
    pub fn light_transform(&self) -> &LightTransform {
        &self.transform
    }

    pub fn lighting(&self) -> &LightingUniform {
        &self.lighting
    }

    /// Whether depth was actually captured.
    pub fn is_shadowed(&self) -> bool {
        self.shadowed
    }
}

/// Owns the shadow target and the light it is rendered from.
pub struct ShadowPass<T> {
    target: Option<T>,
    light: DirectionalLight,
    orbit: LightOrbit,
    config: ShadowConfig,
    ambient: Vec3,
}

impl<T> ShadowPass<T> {
    /// Allocate the shadow target. On failure, log one warning and continue unshadowed.
    pub fn new<A>(
        allocator: &mut A,
        config: ShadowConfig,
        light: DirectionalLight,
        ambient: Vec3,
    ) -> Self
    where
        A: ShadowTargetAllocator<Target = T>,
    {
        let target = match allocator.create_shadow_target(config.resolution) {
            Ok(target) => {
                log::info!(
                    "Shadow map allocated: {}x{}",
                    config.resolution,
                    config.resolution
                );
                Some(target)
            }
            Err(err) => {
                log::warn!("Shadow map unavailable, rendering unshadowed: {err}");
                None
            }
        };
        Self::with_target(target, config, light, ambient)
    }

    /// A pass that never captures depth.
    pub fn disabled(config: ShadowConfig, light: DirectionalLight, ambient: Vec3) -> Self {
        Self::with_target(None, config, light, ambient)
    }

    fn with_target(
        target: Option<T>,
        config: ShadowConfig,
        light: DirectionalLight,
        ambient: Vec3,
    ) -> Self {
        Self {
            target,
            orbit: LightOrbit::fixed(light.direction),
            light,
            config,
            ambient,
        }
    }

    /// Sweep the light about the Y axis at `speed` radians per second.
    pub fn with_orbit_speed(mut self, speed: f32) -> Self {
        self.orbit.speed = speed;
        self
    }

    /// The shadow target, if one was allocated.
    pub fn target(&self) -> Option<&T> {
        self.target.as_ref()
    }

    pub fn is_shadowed(&self) -> bool {
        self.target.is_some()
    }

    pub fn config(&self) -> &ShadowConfig {
        &self.config
    }

    /// The light as it stands `time` seconds into its orbit.
    pub fn light_at(&self, time: f32) -> DirectionalLight {
        DirectionalLight {
            direction: self.orbit.direction_at(time),
            ..self.light.clone()
        }
    }

    /// Light camera for `time`: orthographic, looking at the origin.
    pub fn light_transform(&self, time: f32) -> LightTransform {
        compute_light_transform(self.orbit.direction_at(time), &self.config)
    }

    /// Capture phase: render `mesh` depth from the light into the shadow target.
    pub fn capture<B>(&self, backend: &mut B, mesh: Option<&B::Mesh>, time: f32) -> ShadowCapture
    where
        B: RenderBackend<Target = T>,
    {
        let light = self.light_at(time);
        let transform = compute_light_transform(light.direction, &self.config);
        let lighting =
            LightingUniform::new(&transform, &light, self.ambient, self.config.depth_bias);

        if let Some(target) = &self.target {
            backend.begin_pass(PassTarget::Offscreen(target));
            backend.clear();
            if let Some(mesh) = mesh {
                backend.draw_mesh(mesh, Material::DepthOnly, transform.view_projection());
            }
            backend.end_pass();
        }

        ShadowCapture {
            transform,
            lighting,
            shadowed: self.target.is_some(),
        }
    }

    /// Composite phase: draw the lit terrain to the screen, sampling the
    /// depth captured by `capture`.
    pub fn composite<B>(
        &self,
        backend: &mut B,
        mesh: Option<&B::Mesh>,
        camera_view_proj: Mat4,
        capture: ShadowCapture,
    ) where
        B: RenderBackend<Target = T>,
    {
        backend.begin_pass(PassTarget::Screen);
        backend.clear();
        if capture.shadowed
            && let Some(target) = &self.target
        {
            backend.bind_shadow_map(target);
        }
        backend.set_lighting(&capture.lighting);
        if let Some(mesh) = mesh {
            backend.draw_mesh(mesh, Material::Lit, camera_view_proj);
        }
        backend.end_pass();
    }

    /// Capture then composite one frame. Returns the light transform used.
    pub fn render_frame<B>(
        &self,
        backend: &mut B,
        mesh: Option<&B::Mesh>,
        camera_view_proj: Mat4,
        time: f32,
    ) -> LightTransform
    where
        B: RenderBackend<Target = T>,
    {
        let capture = self.capture(backend, mesh, time);
        let transform = capture.transform;
        self.composite(backend, mesh, camera_view_proj, capture);
        transform
    }
}
