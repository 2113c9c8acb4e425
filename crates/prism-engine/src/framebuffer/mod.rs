//! Framebuffers and the depth attachment lifecycle.
//!
//! A [`Framebuffer`] is assembled each frame from borrowed attachments; the
//! depth image itself lives in a [`DepthAttachment`] that tracks the output
//! size across frames.

mod depth;
mod framebuffer;

pub use depth::{AttachmentState, DepthAttachment};
pub use framebuffer::{ClearValue, Framebuffer};
