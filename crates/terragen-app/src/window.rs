//! Window creation and event handling via winit.
//!
//! [`AppState`] implements winit's [`ApplicationHandler`]: it opens the window,
//! initializes the GPU on `resumed`, and drives one shadow capture plus one lit
//! composite per redraw.

use std::sync::Arc;
use std::time::Instant;

use terragen_config::Config;
use terragen_mesh::{Mesh, MeshStats};
use terragen_render::{
    FrameEncoder, MeshResource, RenderContext, ShadowPass, ShadowTarget, SurfaceError,
    TerrainRenderer, init_render_context_blocking,
};
use tracing::{error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::frame::FrameState;
use crate::settings;

/// Frames between window title refreshes.
const TITLE_REFRESH_INTERVAL: u64 = 30;

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ))
}

/// Application state: the window, GPU context, renderer and the uploaded terrain.
pub struct AppState {
    pub config: Config,
    /// CPU mesh waiting for the GPU. Taken on the first `resumed`.
    mesh: Option<Mesh>,
    stats: MeshStats,
    summary: String,
    pub window: Option<Arc<Window>>,
    pub gpu: Option<RenderContext>,
    renderer: Option<TerrainRenderer>,
    shadow_pass: Option<ShadowPass<ShadowTarget>>,
    terrain: Option<MeshResource>,
    pub frame: FrameState,
    last_frame: Instant,
}

impl AppState {
    pub fn new(config: Config, mesh: Mesh) -> Self {
        let frame = FrameState::new(
            config.window.width,
            config.window.height,
            config.camera.clone(),
            config.debug.show_stats,
        );
        Self {
            stats: mesh.stats(),
            summary: settings::summary(&config),
            mesh: Some(mesh),
            config,
            window: None,
            gpu: None,
            renderer: None,
            shadow_pass: None,
            terrain: None,
            frame,
            last_frame: Instant::now(),
        }
    }

    pub fn stats(&self) -> MeshStats {
        self.stats
    }

    pub fn is_shadowed(&self) -> bool {
        self.shadow_pass
            .as_ref()
            .is_some_and(|pass| pass.is_shadowed())
    }

    /// Build the renderer, the shadow pass and upload the terrain mesh.
    fn initialize_rendering(&mut self, gpu: &RenderContext) {
        let mut renderer = TerrainRenderer::from_context(gpu);

        let shadow_config = settings::shadow_config(&self.config);
        let light = settings::directional_light(&self.config);
        let ambient = settings::ambient(&self.config);
        let shadow_pass = if self.config.shadow.enabled {
            ShadowPass::new(&mut renderer, shadow_config, light, ambient)
        } else {
            info!("Shadow pass disabled by configuration");
            ShadowPass::disabled(shadow_config, light, ambient)
        }
        .with_orbit_speed(self.config.light.orbit_speed);

        if let Some(mesh) = self.mesh.take() {
            match MeshResource::upload(&gpu.device, mesh) {
                Ok(resource) => self.terrain = Some(resource),
                Err(e) => error!("Terrain upload failed, drawing an empty scene: {e}"),
            }
        }

        info!(
            "Rendering initialized: {}x{}, shadows {}",
            self.frame.width,
            self.frame.height,
            if shadow_pass.is_shadowed() { "on" } else { "off" }
        );

        self.renderer = Some(renderer);
        self.shadow_pass = Some(shadow_pass);
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.frame.resize(width, height);
        if let Some(gpu) = &mut self.gpu {
            gpu.resize(width, height);
        }
        if let Some(renderer) = &mut self.renderer {
            renderer.resize(self.frame.width, self.frame.height);
        }
    }

    /// Record and submit one frame. A no-op until rendering is initialized.
    fn render(&self) -> Result<(), SurfaceError> {
        let (Some(gpu), Some(renderer), Some(shadow_pass)) =
            (&self.gpu, &self.renderer, &self.shadow_pass)
        else {
            return Ok(());
        };

        let surface_texture = gpu.get_current_texture()?;
        let camera_view_proj = self.frame.camera().view_projection_matrix();

        let mut frame_encoder = FrameEncoder::new(&gpu.device, gpu.queue.clone(), surface_texture);
        if let Some((encoder, view)) = frame_encoder.encoder_and_view() {
            let mut backend = renderer.begin_frame(encoder, view);
            shadow_pass.render_frame(
                &mut backend,
                self.terrain.as_ref(),
                camera_view_proj,
                self.frame.time,
            );
        }
        frame_encoder.submit();
        Ok(())
    }

    fn refresh_title(&self) {
        if !self.frame.show_stats
            || !self
                .frame
                .frame_count
                .is_multiple_of(TITLE_REFRESH_INTERVAL)
        {
            return;
        }
        if let Some(window) = &self.window {
            window.set_title(&self.frame.title(
                &self.config.window.title,
                &self.stats,
                &self.summary,
                self.is_shadowed(),
            ));
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = window_attributes_from_config(&self.config);
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Window creation failed: {e}");
                event_loop.exit();
                return;
            }
        };

        let inner_size = window.inner_size();
        self.frame.resize(inner_size.width, inner_size.height);

        match init_render_context_blocking(window.clone(), self.config.window.vsync) {
            Ok(ctx) => {
                self.initialize_rendering(&ctx);
                self.gpu = Some(ctx);
            }
            Err(e) => {
                error!("GPU initialization failed: {e}");
                event_loop.exit();
                return;
            }
        }

        self.last_frame = Instant::now();
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.resize(new_size.width, new_size.height);
                info!("Window resized to {}x{}", new_size.width, new_size.height);
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = now.duration_since(self.last_frame).as_secs_f32();
                self.last_frame = now;
                self.frame.advance(dt);

                match self.render() {
                    Ok(()) => {}
                    Err(SurfaceError::Lost) => {
                        warn!("Surface lost, reconfiguring");
                        let (width, height) = (self.frame.width, self.frame.height);
                        self.resize(width, height);
                    }
                    Err(SurfaceError::OutOfMemory) => {
                        error!("GPU out of memory");
                        event_loop.exit();
                        return;
                    }
                    Err(SurfaceError::Timeout) => {
                        warn!("Surface timeout, skipping frame");
                    }
                }

                self.refresh_title();

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Creates an event loop and renders `mesh` until the window is closed.
#[instrument(skip_all)]
pub fn run(config: Config, mesh: Mesh) -> Result<(), winit::error::EventLoopError> {
    let event_loop = EventLoop::new()?;
    let mut app = AppState::new(config, mesh);
    event_loop.run_app(&mut app)
}
