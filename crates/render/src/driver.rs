use crate::camera::PerspectiveCamera;
use crate::controls::OrbitControls;
use glam::{EulerRot, Mat4};
use tumble_common::{BufferSize, SceneConfig, ViewportSize};
use tumble_kernel::{Clock, OvershootPolicy, TumbleStep, Tumbler};

/// Inputs delivered to the frame driver by the platform layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewCommand {
    /// Viewport changed. `viewport` is in logical pixels.
    Resize {
        viewport: ViewportSize,
        device_pixel_ratio: f64,
    },
    /// Pointer drag in logical pixels.
    Orbit { dx: f32, dy: f32 },
    /// Wheel movement; positive zooms in.
    Dolly { steps: f32 },
}

/// Everything a backend needs to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameState {
    pub frame: u64,
    pub elapsed: f64,
    pub step: TumbleStep,
    pub model: Mat4,
    pub view_proj: Mat4,
    /// Linear RGBA wire color.
    pub color: [f32; 4],
}

impl FrameState {
    pub fn mvp(&self) -> Mat4 {
        self.view_proj * self.model
    }
}

/// Owns the animation and view state and turns clock ticks into frames.
///
/// One call to [`frame`] per display refresh: ease the orbit controls, advance
/// the tumble, and produce the matrices for the backend.
///
/// [`frame`]: FrameDriver::frame
pub struct FrameDriver<C: Clock> {
    config: SceneConfig,
    clock: C,
    tumbler: Tumbler,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    viewport: ViewportSize,
    device_pixel_ratio: f64,
    frames: u64,
}

impl<C: Clock> FrameDriver<C> {
    pub fn new(config: SceneConfig, clock: C, viewport: ViewportSize) -> Self {
        let viewport = if viewport.is_drawable() {
            viewport
        } else {
            tracing::warn!(?viewport, "initial viewport is degenerate, using default");
            ViewportSize::default()
        };
        let camera = PerspectiveCamera::from_config(&config, viewport.aspect());
        let controls = OrbitControls::new(&camera, config.orbit_damping);
        Self {
            tumbler: Tumbler::new(config.rotation_rate),
            config,
            clock,
            camera,
            controls,
            viewport,
            device_pixel_ratio: 1.0,
            frames: 0,
        }
    }

    pub fn with_policy(mut self, policy: OvershootPolicy) -> Self {
        self.tumbler = self.tumbler.with_policy(policy);
        self
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn tumbler(&self) -> &Tumbler {
        &self.tumbler
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    /// Render buffer size for the current viewport and pixel ratio.
    pub fn buffer_size(&self) -> BufferSize {
        BufferSize::for_viewport(
            self.viewport,
            self.device_pixel_ratio,
            self.config.max_pixel_ratio,
        )
        .unwrap_or(BufferSize::new(1, 1))
    }

    /// Apply a platform command. Returns the new buffer size when the render
    /// buffers must be resized.
    pub fn handle(&mut self, command: ViewCommand) -> Option<BufferSize> {
        match command {
            ViewCommand::Resize {
                viewport,
                device_pixel_ratio,
            } => match BufferSize::for_viewport(
                viewport,
                device_pixel_ratio,
                self.config.max_pixel_ratio,
            ) {
                Ok(size) => {
                    self.viewport = viewport;
                    self.device_pixel_ratio = device_pixel_ratio;
                    self.camera.set_aspect(viewport.aspect());
                    tracing::debug!(
                        width = viewport.width,
                        height = viewport.height,
                        device_pixel_ratio,
                        buffer_width = size.width,
                        buffer_height = size.height,
                        "viewport resized"
                    );
                    Some(size)
                }
                Err(e) => {
                    tracing::warn!("ignoring resize: {e}");
                    None
                }
            },
            ViewCommand::Orbit { dx, dy } => {
                self.controls.rotate(dx, dy, self.viewport.height as f32);
                None
            }
            ViewCommand::Dolly { steps } => {
                self.controls.dolly(steps);
                None
            }
        }
    }

    /// Advance one frame.
    pub fn frame(&mut self) -> FrameState {
        let elapsed = self.clock.elapsed();
        self.controls.update(&mut self.camera);

        let step = self.tumbler.update(elapsed);
        if let Some(phase) = step.entered {
            tracing::debug!(?phase, elapsed, "entered phase");
        }

        let model = Mat4::from_euler(
            EulerRot::XYZ,
            step.angles.x as f32,
            step.angles.y as f32,
            0.0,
        );
        self.frames += 1;

        FrameState {
            frame: self.frames,
            elapsed,
            step,
            model,
            view_proj: self.camera.view_projection(),
            color: self.config.cube_color.to_linear_rgba(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::tests::FakeStage;
    use crate::stage::{Composer, RenderStage};
    use std::f64::consts::PI;
    use tumble_kernel::{ManualClock, Phase};

    fn driver() -> FrameDriver<ManualClock> {
        FrameDriver::new(
            SceneConfig::default(),
            ManualClock::new(),
            ViewportSize::new(1920.0, 1080.0),
        )
    }

    #[test]
    fn resize_updates_camera_and_every_stage() {
        let mut driver = driver();
        let mut composer: Composer<dyn RenderStage<Context = ()>> =
            Composer::new(driver.buffer_size());
        composer.add_stage(&(), FakeStage::boxed("scene"));
        composer.add_stage(&(), FakeStage::boxed("bloom"));

        let size = driver
            .handle(ViewCommand::Resize {
                viewport: ViewportSize::new(800.0, 600.0),
                device_pixel_ratio: 3.0,
            })
            .unwrap();
        composer.set_size(&(), size);

        assert!((driver.camera().aspect - 800.0 / 600.0).abs() < 1e-6);
        assert_eq!(size, BufferSize::new(1600, 1200));
        for stage in composer.stages() {
            assert_eq!(stage.buffer_size(), BufferSize::new(1600, 1200));
        }
        assert_eq!(driver.buffer_size(), BufferSize::new(1600, 1200));
    }

    #[test]
    fn degenerate_resize_is_ignored() {
        let mut driver = driver();
        let aspect = driver.camera().aspect;
        let result = driver.handle(ViewCommand::Resize {
            viewport: ViewportSize::new(0.0, 600.0),
            device_pixel_ratio: 1.0,
        });
        assert!(result.is_none());
        assert_eq!(driver.camera().aspect, aspect);
        assert_eq!(driver.viewport(), ViewportSize::new(1920.0, 1080.0));
    }

    #[test]
    fn frame_applies_tumble_rotation() {
        let mut driver = driver();
        driver.clock_mut().set(0.25);
        let frame = driver.frame();
        assert_eq!(frame.step.phase, Phase::TiltForward);
        assert!((frame.step.angles.x - PI * 0.25).abs() < 1e-9);

        let expected = Mat4::from_rotation_x((PI * 0.25) as f32);
        assert!(frame.model.abs_diff_eq(expected, 1e-6));
        assert_eq!(frame.frame, 1);

        driver.clock_mut().set(0.5);
        let frame = driver.frame();
        assert_eq!(frame.step.entered, Some(Phase::TurnHalf));
        assert_eq!(frame.frame, 2);
    }

    #[test]
    fn orbit_command_eases_camera() {
        let mut driver = driver();
        let start = driver.camera().position;
        driver.handle(ViewCommand::Orbit { dx: 100.0, dy: 0.0 });
        driver.frame();
        let moved = driver.camera().position;
        assert_ne!(start, moved);
        assert!((driver.camera().distance() - 3.0).abs() < 1e-4);
    }

    #[test]
    fn degenerate_initial_viewport_falls_back() {
        let driver = FrameDriver::new(
            SceneConfig::default(),
            ManualClock::new(),
            ViewportSize::new(0.0, 0.0),
        );
        assert!(driver.viewport().is_drawable());
        assert!(driver.camera().aspect.is_finite());
    }

    #[test]
    fn wire_color_is_linear_yellow() {
        let mut driver = driver();
        let frame = driver.frame();
        assert_eq!(frame.color[0], 1.0);
        assert!(frame.color[1] > 0.8);
        assert_eq!(frame.color[2], 0.0);
    }
}
