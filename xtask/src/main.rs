use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::process::Command;

const WASM_TARGET: &str = "wasm32-unknown-unknown";

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for tumble")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks: fmt, clippy, tests, deny, doc
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates
    Clippy,
    /// Run all tests
    Test,
    /// Run cargo deny check
    Deny,
    /// Build rustdoc for the workspace
    Doc,
    /// Build the entire workspace
    Build,
    /// Build the viewer for the browser
    Wasm {
        /// Build with optimizations
        #[arg(long)]
        release: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            for step in [fmt_args(), clippy_args(), test_args(), deny_args(), doc_args()] {
                cargo(&step)?;
            }
        }
        Commands::Fmt => cargo(&fmt_args())?,
        Commands::Clippy => cargo(&clippy_args())?,
        Commands::Test => cargo(&test_args())?,
        Commands::Deny => cargo(&deny_args())?,
        Commands::Doc => cargo(&doc_args())?,
        Commands::Build => cargo(&["build", "--workspace"])?,
        Commands::Wasm { release } => cargo(&wasm_args(release))?,
    }

    Ok(())
}

fn fmt_args() -> Vec<&'static str> {
    vec!["fmt", "--all", "--", "--check"]
}

fn clippy_args() -> Vec<&'static str> {
    vec!["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"]
}

fn test_args() -> Vec<&'static str> {
    vec!["test", "--workspace"]
}

fn deny_args() -> Vec<&'static str> {
    vec!["deny", "check", "licenses", "bans", "sources"]
}

fn doc_args() -> Vec<&'static str> {
    vec!["doc", "--workspace", "--no-deps"]
}

fn wasm_args(release: bool) -> Vec<&'static str> {
    let mut args = vec!["build", "-p", "tumble-viewer", "--target", WASM_TARGET];
    if release {
        args.push("--release");
    }
    args
}

/// Run `cargo` with `args`, failing on a non-zero exit.
fn cargo<S: AsRef<str>>(args: &[S]) -> Result<()> {
    let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
    println!("==> Running cargo {}", args.join(" "));
    let status = Command::new("cargo").args(&args).status()?;
    if !status.success() {
        bail!("cargo {} failed", args.join(" "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wasm_build_targets_the_viewer() {
        let args = wasm_args(true);
        assert_eq!(&args[..3], &["build", "-p", "tumble-viewer"]);
        assert!(args.contains(&WASM_TARGET));
        assert_eq!(args.last(), Some(&"--release"));
        assert!(!wasm_args(false).contains(&"--release"));
    }
}
