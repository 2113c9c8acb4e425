use super::{Image, ImageFormat};

/// Image allocation contract: `allocate(width, height, format)` and `free`.
pub trait ImageAllocator {
    fn allocate(&mut self, width: u32, height: u32, format: ImageFormat) -> Image;

    fn free(&mut self, image: Image);
}

/// Allocates images on the heap; freeing drops them.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeapAllocator;

impl ImageAllocator for HeapAllocator {
    fn allocate(&mut self, width: u32, height: u32, format: ImageFormat) -> Image {
        log::trace!("allocating {format:?} image {width}x{height}");
        Image::allocate(width, height, format)
    }

    fn free(&mut self, image: Image) {
        log::trace!("freeing {:?} image {}x{}", image.format(), image.width(), image.height());
        drop(image);
    }
}
