//! Shared value types, fixed scene configuration and the error type.

mod config;
mod error;
mod types;

pub use config::{BloomSettings, SceneConfig};
pub use error::TumbleError;
pub use types::{BufferSize, Rgb, ViewportSize, effective_pixel_ratio};

pub fn crate_info() -> &'static str {
    concat!("tumble-common v", env!("CARGO_PKG_VERSION"))
}
