use thiserror::Error;

use crate::image::ImageFormat;

/// Errors raised by [`Rasterizer`](super::Rasterizer) before the engine runs.
///
/// All of them are detected before any attachment is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("attachment size mismatch: framebuffer has {expected} attachments, {actual} clear values supplied")]
    AttachmentCountMismatch { expected: usize, actual: usize },

    #[error("clear value {attachment} is for {value:?}, attachment is {attachment_format:?}")]
    ClearValueFormat {
        attachment: usize,
        value: ImageFormat,
        attachment_format: ImageFormat,
    },

    #[error("attachment {attachment} is {actual:?}, framebuffer is {expected:?}")]
    AttachmentExtent {
        attachment: usize,
        expected: (u32, u32),
        actual: (u32, u32),
    },
}
