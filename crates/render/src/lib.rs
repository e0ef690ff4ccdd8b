//! Rendering model: backend-agnostic camera, orbit controls, geometry, the
//! render-stage chain and the frame driver.
//!
//! # Invariants
//! - Only the frame driver mutates animation and view state.
//! - Every stage in a composer shares the composer's buffer size.
//! - Backends consume [`FrameState`]; they never touch the tumble state.

mod camera;
mod controls;
mod driver;
mod geometry;
mod stage;

pub use camera::PerspectiveCamera;
pub use controls::OrbitControls;
pub use driver::{FrameDriver, FrameState, ViewCommand};
pub use geometry::{WireframeMesh, wireframe_box};
pub use stage::{Composer, RenderStage, StageRun, StageTarget};

pub fn crate_info() -> &'static str {
    concat!("tumble-render v", env!("CARGO_PKG_VERSION"))
}
