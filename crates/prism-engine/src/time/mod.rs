//! Frame timing.
//!
//! The frame loop ticks one [`FrameClock`] per frame; the first tick of a
//! clock reports a zero delta.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTick};
