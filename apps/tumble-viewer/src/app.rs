use crate::gfx::Gfx;
use std::sync::Arc;
use tumble_common::{SceneConfig, TumbleError, ViewportSize};
use tumble_kernel::{OvershootPolicy, SystemClock};
use tumble_render::{FrameDriver, ViewCommand};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes, WindowId};

#[cfg(target_arch = "wasm32")]
thread_local! {
    static PENDING_GFX: std::cell::RefCell<Option<Result<Gfx, TumbleError>>> =
        const { std::cell::RefCell::new(None) };
}

/// Pixel-delta wheel events report roughly this many pixels per notch.
const PIXELS_PER_WHEEL_STEP: f64 = 100.0;

#[derive(Default)]
struct Pointer {
    dragging: bool,
    last: Option<PhysicalPosition<f64>>,
}

pub struct TumbleApp {
    scene: SceneConfig,
    initial_viewport: ViewportSize,
    driver: FrameDriver<SystemClock>,
    window: Option<Arc<Window>>,
    gfx: Option<Gfx>,
    pointer: Pointer,
    /// Startup failure that stopped the app.
    fatal: Option<TumbleError>,
}

impl TumbleApp {
    pub fn new(scene: SceneConfig, policy: OvershootPolicy, viewport: ViewportSize) -> Self {
        let driver = FrameDriver::new(scene, SystemClock::start(), viewport).with_policy(policy);
        Self {
            scene,
            initial_viewport: viewport,
            driver,
            window: None,
            gfx: None,
            pointer: Pointer::default(),
            fatal: None,
        }
    }

    /// Record an unrecoverable startup error. The app stops drawing after this.
    fn fail(&mut self, error: TumbleError) {
        tracing::error!("startup failed: {error}");
        self.gfx = None;
        self.fatal = Some(error);
    }

    /// The startup error, if the app stopped because of one.
    pub fn take_fatal(&mut self) -> Option<TumbleError> {
        self.fatal.take()
    }

    fn window_attributes(&self) -> Result<WindowAttributes, TumbleError> {
        let attrs = Window::default_attributes()
            .with_title("tumble")
            .with_inner_size(LogicalSize::new(
                self.initial_viewport.width,
                self.initial_viewport.height,
            ));

        #[cfg(target_arch = "wasm32")]
        let attrs = {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            let canvas = web_sys::window()
                .and_then(|win| win.document())
                .and_then(|doc| doc.query_selector("canvas.webgl").ok().flatten())
                .and_then(|el| el.dyn_into::<web_sys::HtmlCanvasElement>().ok())
                .ok_or_else(|| TumbleError::SurfaceNotFound("canvas.webgl".into()))?;
            attrs.with_canvas(Some(canvas))
        };

        Ok(attrs)
    }

    fn resize(&mut self, physical: PhysicalSize<u32>, scale_factor: f64) {
        let logical = physical.to_logical::<f64>(scale_factor);
        let command = ViewCommand::Resize {
            viewport: ViewportSize::new(logical.width, logical.height),
            device_pixel_ratio: scale_factor,
        };
        if let (Some(size), Some(gfx)) = (self.driver.handle(command), &mut self.gfx) {
            gfx.resize(size);
        }
    }

    fn pointer_moved(&mut self, position: PhysicalPosition<f64>) {
        let scale = self.window.as_ref().map_or(1.0, |w| w.scale_factor());
        if self.pointer.dragging {
            if let Some(last) = self.pointer.last {
                self.driver.handle(ViewCommand::Orbit {
                    dx: ((position.x - last.x) / scale) as f32,
                    dy: ((position.y - last.y) / scale) as f32,
                });
            }
        }
        self.pointer.last = Some(position);
    }

    fn wheel(&mut self, delta: MouseScrollDelta) {
        let steps = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(p) => (p.y / PIXELS_PER_WHEEL_STEP) as f32,
        };
        if steps != 0.0 {
            self.driver.handle(ViewCommand::Dolly { steps });
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn adopt_pending_gfx(&mut self) {
        if self.gfx.is_some() {
            return;
        }
        match PENDING_GFX.with(|slot| slot.borrow_mut().take()) {
            Some(Ok(mut gfx)) => {
                gfx.resize(self.driver.buffer_size());
                self.gfx = Some(gfx);
            }
            Some(Err(e)) => self.fail(e),
            None => {}
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        #[cfg(target_arch = "wasm32")]
        self.adopt_pending_gfx();

        if self.fatal.is_some() {
            return;
        }

        let frame = self.driver.frame();
        if let Some(gfx) = &mut self.gfx {
            match gfx.render(&frame) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gfx.reconfigure(),
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    tracing::error!("surface out of memory");
                    event_loop.exit();
                }
                Err(e) => tracing::warn!("surface error: {e}"),
            }
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for TumbleApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match self
            .window_attributes()
            .and_then(|attrs| {
                event_loop
                    .create_window(attrs)
                    .map_err(|e| TumbleError::SurfaceCreation(e.to_string()))
            }) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(e);
                event_loop.exit();
                return;
            }
        };

        self.resize(window.inner_size(), window.scale_factor());
        let size = self.driver.buffer_size();

        #[cfg(not(target_arch = "wasm32"))]
        match pollster::block_on(Gfx::new(window.clone(), &self.scene, size)) {
            Ok(gfx) => self.gfx = Some(gfx),
            Err(e) => {
                self.fail(e);
                event_loop.exit();
                return;
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let scene = self.scene;
            let target = window.clone();
            let target_redraw = window.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let result = Gfx::new(target, &scene, size).await;
                PENDING_GFX.with(|slot| *slot.borrow_mut() = Some(result));
                // Wake the redraw handler so it adopts the result.
                target_redraw.request_redraw();
            });
        }

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
                event_loop.exit();
            }
            WindowEvent::Resized(physical) => {
                let scale = self.window.as_ref().map_or(1.0, |w| w.scale_factor());
                self.resize(physical, scale);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(window) = &self.window {
                    let physical = window.inner_size();
                    self.resize(physical, scale_factor);
                }
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                self.pointer.dragging = state == ElementState::Pressed;
            }
            WindowEvent::CursorMoved { position, .. } => self.pointer_moved(position),
            WindowEvent::CursorLeft { .. } => {
                self.pointer.dragging = false;
                self.pointer.last = None;
            }
            WindowEvent::MouseWheel { delta, .. } => self.wheel(delta),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}
