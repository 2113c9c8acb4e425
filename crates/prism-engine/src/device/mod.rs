//! Presentation device.
//!
//! Owns the wgpu device and the window surface, and copies finished CPU
//! frames into the swapchain.

mod gpu;

pub use gpu::{Gpu, GpuInit, SurfaceErrorAction};
