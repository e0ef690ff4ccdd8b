use std::sync::Arc;
use tumble_common::{BufferSize, SceneConfig, TumbleError};
use tumble_render::FrameState;
use tumble_render_wgpu::{GpuContext, TumbleRenderer};
use winit::window::Window;

/// Surface, device and renderer for one window.
pub struct Gfx {
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    gpu: GpuContext,
    renderer: TumbleRenderer,
}

impl Gfx {
    pub async fn new(
        window: Arc<Window>,
        scene: &SceneConfig,
        size: BufferSize,
    ) -> Result<Self, TumbleError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .map_err(|e| TumbleError::SurfaceCreation(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(TumbleError::NoAdapter)?;

        #[cfg(target_arch = "wasm32")]
        let required_limits =
            wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits());
        #[cfg(not(target_arch = "wasm32"))]
        let required_limits = wgpu::Limits::default().using_resolution(adapter.limits());

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("tumble_device"),
                    required_features: wgpu::Features::empty(),
                    required_limits,
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(|e| TumbleError::DeviceRequest(e.to_string()))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .ok_or_else(|| TumbleError::SurfaceCreation("no supported surface format".into()))?;

        let gpu = GpuContext {
            device,
            queue,
            surface_format: format,
        };
        let renderer = TumbleRenderer::new(&gpu, scene, size);
        let size = renderer.size();

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&gpu.device, &config);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            ?format,
            "GPU initialized"
        );

        Ok(Self {
            surface,
            config,
            gpu,
            renderer,
        })
    }

    /// Resize the drawing buffer. The surface follows the renderer's clamped size.
    pub fn resize(&mut self, size: BufferSize) {
        self.renderer.resize(&self.gpu, size);
        let size = self.renderer.size();
        if size.width == self.config.width && size.height == self.config.height {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.reconfigure();
    }

    pub fn reconfigure(&self) {
        self.surface.configure(&self.gpu.device, &self.config);
    }

    pub fn render(&mut self, frame: &FrameState) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.renderer.render(&self.gpu, &view, frame);
        output.present();
        Ok(())
    }
}
