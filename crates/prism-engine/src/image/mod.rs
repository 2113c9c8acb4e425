//! CPU images used as framebuffer attachments.
//!
//! Images are owned values: allocation returns an `Image`, freeing consumes
//! it. Allocation goes through an [`ImageAllocator`] so callers (and tests)
//! can observe the allocate/free sequence.

mod allocator;
mod color;
mod image;

pub use allocator::{HeapAllocator, ImageAllocator};
pub use color::PackedColor;
pub use image::{Image, ImageData, ImageFormat};
