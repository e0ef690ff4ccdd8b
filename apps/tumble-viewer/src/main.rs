mod app;
mod gfx;

use anyhow::Result;
use clap::Parser;
use tumble_common::{SceneConfig, ViewportSize};
use tumble_kernel::OvershootPolicy;
use winit::event_loop::{ControlFlow, EventLoop};

#[derive(Parser, Debug, Clone)]
#[command(name = "tumble-viewer", about = "Rotating wireframe cube with bloom")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Carry time past a phase boundary into the next phase instead of
    /// dropping it
    #[arg(long)]
    carry_overshoot: bool,

    /// Disable the bloom pass
    #[arg(long)]
    no_bloom: bool,

    /// Initial window width in logical pixels
    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    /// Initial window height in logical pixels
    #[arg(long, default_value_t = 720.0)]
    height: f64,
}

impl Cli {
    fn scene_config(&self) -> SceneConfig {
        let mut config = SceneConfig::default();
        config.bloom.enabled = !self.no_bloom;
        config
    }

    fn policy(&self) -> OvershootPolicy {
        if self.carry_overshoot {
            OvershootPolicy::Carry
        } else {
            OvershootPolicy::Discard
        }
    }

    fn viewport(&self) -> ViewportSize {
        ViewportSize::new(self.width, self.height)
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<()> {
    use tracing_subscriber::EnvFilter;

    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!(render = tumble_render::crate_info(), "tumble-viewer starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = app::TumbleApp::new(cli.scene_config(), cli.policy(), cli.viewport());
    event_loop.run_app(&mut app)?;

    if let Some(error) = app.take_fatal() {
        return Err(error.into());
    }
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() -> Result<()> {
    use winit::platform::web::EventLoopExtWebSys;

    console_error_panic_hook::set_once();

    // The browser has no command line; run with the defaults.
    let cli = Cli::parse_from(["tumble-viewer"]);
    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(tracing::Level::INFO)
            .build(),
    );

    tracing::info!(render = tumble_render::crate_info(), "tumble-viewer starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    event_loop.spawn_app(app::TumbleApp::new(
        cli.scene_config(),
        cli.policy(),
        cli.viewport(),
    ));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_discard_overshoot_with_bloom() {
        let cli = Cli::parse_from(["tumble-viewer"]);
        assert_eq!(cli.policy(), OvershootPolicy::Discard);
        assert!(cli.scene_config().bloom.enabled);
        assert_eq!(cli.viewport(), ViewportSize::new(1280.0, 720.0));
    }

    #[test]
    fn flags_map_to_config() {
        let cli = Cli::parse_from([
            "tumble-viewer",
            "--carry-overshoot",
            "--no-bloom",
            "--width",
            "800",
            "--height",
            "600",
        ]);
        assert_eq!(cli.policy(), OvershootPolicy::Carry);
        assert!(!cli.scene_config().bloom.enabled);
        assert_eq!(cli.viewport(), ViewportSize::new(800.0, 600.0));
    }
}
