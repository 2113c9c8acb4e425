//! Window collaborator: event polling, close requests, backbuffer, swap.
//!
//! [`Window`] drives a winit window by pumping its event loop once per frame
//! and presents the CPU backbuffer through [`Gpu`](crate::device::Gpu).
//! [`HeadlessSurface`] renders offscreen and closes itself after a frame limit.

mod headless;
mod platform;

pub use headless::HeadlessSurface;
pub use platform::Window;

use crate::image::Image;

/// Initial window parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Test".to_string(),
            width: 1600,
            height: 900,
        }
    }
}

/// A presentable surface polled once per frame by the frame loop.
pub trait FrameSurface {
    /// Processes pending events without blocking.
    fn poll(&mut self);

    fn is_close_requested(&self) -> bool;

    /// Current drawable size in pixels.
    fn framebuffer_size(&self) -> (u32, u32);

    /// Color image for this frame, sized to [`framebuffer_size`](Self::framebuffer_size).
    fn backbuffer(&mut self) -> &mut Image;

    /// Presents the backbuffer.
    fn swap_buffers(&mut self) -> anyhow::Result<()>;
}
