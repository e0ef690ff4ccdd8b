//! Animation kernel: clocks and the four-phase tumble state machine.
//!
//! # Invariants
//! - The state machine is pure with respect to the elapsed times it is fed.
//! - Rotation state is only mutated through [`Tumbler::update`].

pub mod clock;
pub mod tumble;

pub use clock::{Clock, ManualClock, SystemClock};
pub use tumble::{AnimationState, Axis, OvershootPolicy, Phase, RotationAngles, TumbleStep, Tumbler};

pub fn crate_info() -> &'static str {
    concat!("tumble-kernel v", env!("CARGO_PKG_VERSION"))
}
