//! UI overlay composited on top of the rendered frame.
//!
//! The overlay builds its draw data at the start of a frame and paints it into
//! the same framebuffer after the scene draw.

mod stats;

pub use stats::{FrameStatsOverlay, OverlayRect};

use crate::framebuffer::Framebuffer;
use crate::frame::FrameReport;

/// Overlay renderer driven by the frame loop.
pub trait Overlay {
    /// Builds this frame's draw data. `previous` is the last finished frame.
    fn begin_frame(&mut self, previous: Option<&FrameReport>);

    /// Composites the draw data onto `framebuffer`.
    fn render(&mut self, framebuffer: &mut Framebuffer<'_>);
}

/// Overlay that draws nothing.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoOverlay;

impl Overlay for NoOverlay {
    fn begin_frame(&mut self, _previous: Option<&FrameReport>) {}

    fn render(&mut self, _framebuffer: &mut Framebuffer<'_>) {}
}

impl<O: Overlay> Overlay for Option<O> {
    fn begin_frame(&mut self, previous: Option<&FrameReport>) {
        if let Some(overlay) = self {
            overlay.begin_frame(previous);
        }
    }

    fn render(&mut self, framebuffer: &mut Framebuffer<'_>) {
        if let Some(overlay) = self {
            overlay.render(framebuffer);
        }
    }
}
