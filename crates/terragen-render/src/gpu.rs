//! Window-backed GPU state: adapter, device, queue and the presentation surface.

use std::sync::Arc;
use winit::window::Window;

/// Failure while bringing up the GPU for a window.
#[derive(Debug, thiserror::Error)]
pub enum RenderContextError {
    #[error("no compatible GPU adapter found")]
    NoAdapter,

    #[error("failed to request GPU device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    #[error("failed to create surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),

    /// The adapter offers no formats for this surface.
    #[error("surface is not compatible with the selected adapter")]
    IncompatibleSurface,
}

/// Why no swapchain texture was handed out this frame.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    /// Still unusable after one reconfigure.
    #[error("surface lost")]
    Lost,

    #[error("out of memory")]
    OutOfMemory,

    /// Skip the frame and try again.
    #[error("timeout")]
    Timeout,
}

/// GPU handles for one window. The surface format lives in `surface_config.format`.
pub struct RenderContext {
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
}

impl RenderContext {
    pub async fn new(window: Arc<Window>, vsync: bool) -> Result<Self, RenderContextError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let size = window.inner_size();
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderContextError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!(
            "Selected GPU: {} ({:?}, {:?})",
            info.name,
            info.backend,
            info.device_type
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("terragen-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let caps = surface.get_capabilities(&adapter);
        let surface_config = surface_configuration(
            &caps.formats,
            &caps.present_modes,
            &caps.alpha_modes,
            (size.width, size.height),
            vsync,
        )
        .ok_or(RenderContextError::IncompatibleSurface)?;

        surface.configure(&device, &surface_config);
        log::info!(
            "Surface configured: {}x{} {:?} {:?}",
            surface_config.width,
            surface_config.height,
            surface_config.format,
            surface_config.present_mode
        );

        Ok(Self {
            adapter,
            device,
            queue,
            surface,
            surface_config,
        })
    }

    /// Reconfigure after a window resize. Zero dimensions become 1.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface_config.width = width.max(1);
        self.surface_config.height = height.max(1);
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Current surface size in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_config.format
    }

    /// Next swapchain texture. A lost or outdated surface is reconfigured once.
    pub fn get_current_texture(&self) -> Result<wgpu::SurfaceTexture, SurfaceError> {
        let error = match self.surface.get_current_texture() {
            Ok(texture) => return Ok(texture),
            Err(error) => error,
        };
        match error {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                log::warn!("Surface {error:?}, reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
                self.surface
                    .get_current_texture()
                    .map_err(|_| SurfaceError::Lost)
            }
            wgpu::SurfaceError::OutOfMemory => Err(SurfaceError::OutOfMemory),
            wgpu::SurfaceError::Timeout => Err(SurfaceError::Timeout),
            wgpu::SurfaceError::Other => {
                log::error!("Unrecognized surface error");
                Err(SurfaceError::Lost)
            }
        }
    }
}

/// Block on [`RenderContext::new`] with `pollster`.
pub fn init_render_context_blocking(
    window: Arc<Window>,
    vsync: bool,
) -> Result<RenderContext, RenderContextError> {
    pollster::block_on(RenderContext::new(window, vsync))
}

/// Swapchain setup from the surface capabilities. `None` when no format is offered.
fn surface_configuration(
    formats: &[wgpu::TextureFormat],
    present_modes: &[wgpu::PresentMode],
    alpha_modes: &[wgpu::CompositeAlphaMode],
    (width, height): (u32, u32),
    vsync: bool,
) -> Option<wgpu::SurfaceConfiguration> {
    Some(wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format: pick_format(formats)?,
        width: width.max(1),
        height: height.max(1),
        present_mode: pick_present_mode(present_modes, vsync),
        alpha_mode: alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto),
        view_formats: Vec::new(),
        desired_maximum_frame_latency: 2,
    })
}

/// First sRGB format in preference order, else whatever the surface lists first.
fn pick_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    const PREFERRED: [wgpu::TextureFormat; 2] = [
        wgpu::TextureFormat::Bgra8UnormSrgb,
        wgpu::TextureFormat::Rgba8UnormSrgb,
    ];
    PREFERRED
        .into_iter()
        .find(|f| formats.contains(f))
        .or_else(|| formats.iter().copied().find(|f| f.is_srgb()))
        .or_else(|| formats.first().copied())
}

/// Fifo when vsync is requested; otherwise the lowest-latency mode available.
fn pick_present_mode(modes: &[wgpu::PresentMode], vsync: bool) -> wgpu::PresentMode {
    if vsync {
        return wgpu::PresentMode::Fifo;
    }
    [wgpu::PresentMode::Mailbox, wgpu::PresentMode::Immediate]
        .into_iter()
        .find(|mode| modes.contains(mode))
        .unwrap_or(wgpu::PresentMode::Fifo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::TextureFormat as Tf;

    #[test]
    fn test_pick_format_order() {
        assert_eq!(
            pick_format(&[Tf::Rgba8Unorm, Tf::Rgba8UnormSrgb, Tf::Bgra8UnormSrgb]),
            Some(Tf::Bgra8UnormSrgb)
        );
        assert_eq!(
            pick_format(&[Tf::Rgba8Unorm, Tf::Rgba8UnormSrgb]),
            Some(Tf::Rgba8UnormSrgb)
        );
        assert_eq!(
            pick_format(&[Tf::Rgba16Float, Tf::Rgba8Unorm]),
            Some(Tf::Rgba16Float)
        );
        assert_eq!(pick_format(&[]), None);
    }

    #[test]
    fn test_vsync_selects_fifo() {
        let modes = [wgpu::PresentMode::Mailbox, wgpu::PresentMode::Fifo];
        assert_eq!(pick_present_mode(&modes, true), wgpu::PresentMode::Fifo);
    }

    #[test]
    fn test_no_vsync_prefers_mailbox_then_immediate() {
        let modes = [wgpu::PresentMode::Fifo, wgpu::PresentMode::Immediate];
        assert_eq!(pick_present_mode(&modes, false), wgpu::PresentMode::Immediate);

        let modes = [wgpu::PresentMode::Fifo, wgpu::PresentMode::Mailbox];
        assert_eq!(pick_present_mode(&modes, false), wgpu::PresentMode::Mailbox);

        assert_eq!(
            pick_present_mode(&[wgpu::PresentMode::Fifo], false),
            wgpu::PresentMode::Fifo
        );
    }

    #[test]
    fn test_surface_configuration_clamps_size() {
        let config = surface_configuration(
            &[Tf::Bgra8UnormSrgb],
            &[wgpu::PresentMode::Fifo],
            &[wgpu::CompositeAlphaMode::Opaque],
            (0, 720),
            true,
        );
        let config = config.unwrap();
        assert_eq!((config.width, config.height), (1, 720));
        assert_eq!(config.format, Tf::Bgra8UnormSrgb);
        assert_eq!(config.alpha_mode, wgpu::CompositeAlphaMode::Opaque);
    }

    #[test]
    fn test_surface_configuration_without_formats() {
        assert!(surface_configuration(&[], &[], &[], (800, 600), false).is_none());
    }
}
