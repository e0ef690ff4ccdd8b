use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use tumble_common::{BufferSize, SceneConfig, ViewportSize, effective_pixel_ratio};
use tumble_kernel::{Clock, ManualClock, OvershootPolicy, Phase, Tumbler};

#[derive(Parser)]
#[command(name = "tumble-cli", about = "Inspect the tumble animation without a window")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Step the phase machine at a fixed frame rate and print every frame
    Trace {
        /// Simulated frames per second
        #[arg(long, default_value = "60")]
        fps: f64,
        /// Simulated duration in seconds
        #[arg(long, default_value = "3")]
        seconds: f64,
        /// Carry overshoot into the next phase
        #[arg(long)]
        carry_overshoot: bool,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show the camera aspect and drawing-buffer size for a viewport
    Resize {
        #[arg(long)]
        width: f64,
        #[arg(long)]
        height: f64,
        /// Device pixel ratio
        #[arg(long, default_value = "1")]
        dpr: f64,
    },
}

#[derive(Debug, Serialize)]
struct TraceRow {
    frame: u64,
    time: f64,
    phase: Phase,
    x: f64,
    y: f64,
    entered: bool,
}

fn trace(fps: f64, seconds: f64, policy: OvershootPolicy) -> Result<Vec<TraceRow>> {
    if !fps.is_finite() || fps <= 0.0 {
        bail!("fps must be positive, got {fps}");
    }
    if !seconds.is_finite() || seconds < 0.0 {
        bail!("seconds must be non-negative, got {seconds}");
    }

    let config = SceneConfig::default();
    let mut tumbler = Tumbler::new(config.rotation_rate).with_policy(policy);
    let mut clock = ManualClock::new();
    let frames = (seconds * fps).round() as u64;

    let mut rows = Vec::with_capacity(frames as usize + 1);
    for frame in 0..=frames {
        clock.set(frame as f64 / fps);
        let time = clock.elapsed();
        let step = tumbler.update(time);
        rows.push(TraceRow {
            frame,
            time,
            phase: step.phase,
            x: step.angles.x,
            y: step.angles.y,
            entered: step.entered.is_some(),
        });
    }
    Ok(rows)
}

#[derive(Debug, Serialize)]
struct ResizeReport {
    aspect: f32,
    pixel_ratio: f64,
    buffer: BufferSize,
}

fn resize(width: f64, height: f64, dpr: f64) -> Result<ResizeReport> {
    let config = SceneConfig::default();
    let viewport = ViewportSize::new(width, height);
    let buffer = BufferSize::for_viewport(viewport, dpr, config.max_pixel_ratio)?;
    Ok(ResizeReport {
        aspect: viewport.aspect(),
        pixel_ratio: effective_pixel_ratio(dpr, config.max_pixel_ratio),
        buffer,
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            let config = SceneConfig::default();
            let tumbler = Tumbler::new(config.rotation_rate);
            println!("tumble-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", tumble_common::crate_info());
            println!("kernel: {}", tumble_kernel::crate_info());
            println!("render: {}", tumble_render::crate_info());
            println!(
                "cycle: {:.3}s at {:.4} rad/s",
                tumbler.cycle_duration(),
                config.rotation_rate
            );
        }
        Commands::Trace {
            fps,
            seconds,
            carry_overshoot,
            json,
        } => {
            let policy = if carry_overshoot {
                OvershootPolicy::Carry
            } else {
                OvershootPolicy::Discard
            };
            tracing::debug!(fps, seconds, ?policy, "tracing tumble");
            let rows = trace(fps, seconds, policy)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                println!("{:>6} {:>8} {:>5} {:>9} {:>9}", "frame", "time", "phase", "x", "y");
                for row in &rows {
                    println!(
                        "{:>6} {:>8.4} {:>5} {:>9.5} {:>9.5}{}",
                        row.frame,
                        row.time,
                        row.phase.index(),
                        row.x,
                        row.y,
                        if row.entered { "  *" } else { "" }
                    );
                }
            }
        }
        Commands::Resize { width, height, dpr } => {
            let report = resize(width, height, dpr)?;
            println!("aspect: {:.4}", report.aspect);
            println!("pixel ratio: {}", report.pixel_ratio);
            println!(
                "buffer: {}x{}",
                report.buffer.width, report.buffer.height
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_visits_phases_in_order() {
        let rows = trace(60.0, 3.2, OvershootPolicy::Discard).unwrap();
        assert_eq!(rows.len(), 193);
        let entered: Vec<u8> = rows
            .iter()
            .filter(|r| r.entered)
            .map(|r| r.phase.index())
            .collect();
        assert_eq!(&entered[..4], &[1, 2, 3, 0]);
    }

    #[test]
    fn trace_rejects_bad_rate() {
        assert!(trace(0.0, 1.0, OvershootPolicy::Discard).is_err());
        assert!(trace(f64::NAN, 1.0, OvershootPolicy::Discard).is_err());
        assert!(trace(60.0, -1.0, OvershootPolicy::Discard).is_err());
    }

    #[test]
    fn trace_rows_serialize() {
        let rows = trace(10.0, 0.1, OvershootPolicy::Carry).unwrap();
        let json = serde_json::to_value(&rows).unwrap();
        assert_eq!(json[0]["phase"], "TiltForward");
        assert_eq!(json[1]["frame"], 1);
    }

    #[test]
    fn resize_caps_pixel_ratio() {
        let report = resize(800.0, 600.0, 3.0).unwrap();
        assert_eq!(report.buffer, BufferSize::new(1600, 1200));
        assert_eq!(report.pixel_ratio, 2.0);
        assert!((report.aspect - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn resize_rejects_empty_viewport() {
        assert!(resize(0.0, 600.0, 1.0).is_err());
    }
}
