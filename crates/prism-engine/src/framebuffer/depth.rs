use crate::image::{Image, ImageAllocator, ImageFormat};

/// Depth attachment state relative to a target size.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AttachmentState {
    /// No depth image allocated.
    Absent,
    /// Allocated and matching the target size.
    Valid { width: u32, height: u32 },
    /// Allocated with a size that no longer matches the target.
    Stale { width: u32, height: u32 },
}

/// Owns the depth image and keeps it sized to the framebuffer.
///
/// Checked once per frame before drawing: reallocates when absent or when the
/// stored size differs from the target, otherwise does nothing. The previous
/// image is always freed before its replacement is allocated.
#[derive(Debug, Default)]
pub struct DepthAttachment {
    image: Option<Image>,
}

impl DepthAttachment {
    pub fn new() -> Self {
        Self { image: None }
    }

    /// State of the held image against a `width × height` target.
    pub fn state(&self, width: u32, height: u32) -> AttachmentState {
        match &self.image {
            None => AttachmentState::Absent,
            Some(image) if image.size() == (width, height) => AttachmentState::Valid { width, height },
            Some(image) => AttachmentState::Stale {
                width: image.width(),
                height: image.height(),
            },
        }
    }

    /// Size of the held image, if any.
    pub fn size(&self) -> Option<(u32, u32)> {
        self.image.as_ref().map(Image::size)
    }

    /// Makes the attachment valid for `width × height`.
    ///
    /// Returns `true` when a new image was allocated.
    pub fn ensure<A>(&mut self, width: u32, height: u32, allocator: &mut A) -> bool
    where
        A: ImageAllocator + ?Sized,
    {
        match self.state(width, height) {
            AttachmentState::Valid { .. } => false,
            state => {
                if let Some(old) = self.image.take() {
                    allocator.free(old);
                }
                log::debug!("depth attachment {state:?} -> {width}x{height}");
                self.image = Some(allocator.allocate(width, height, ImageFormat::Depth32));
                true
            }
        }
    }

    /// The depth image, once [`ensure`](Self::ensure) has run.
    pub fn image_mut(&mut self) -> Option<&mut Image> {
        self.image.as_mut()
    }

    pub fn image(&self) -> Option<&Image> {
        self.image.as_ref()
    }

    /// Frees the image. Further calls are no-ops.
    pub fn release<A>(&mut self, allocator: &mut A)
    where
        A: ImageAllocator + ?Sized,
    {
        if let Some(image) = self.image.take() {
            log::debug!("releasing depth attachment {}x{}", image.width(), image.height());
            allocator.free(image);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Op {
        Alloc(u32, u32),
        Free(u32, u32),
    }

    #[derive(Default)]
    struct Recording {
        ops: Vec<Op>,
    }

    impl ImageAllocator for Recording {
        fn allocate(&mut self, width: u32, height: u32, format: ImageFormat) -> Image {
            assert_eq!(format, ImageFormat::Depth32);
            self.ops.push(Op::Alloc(width, height));
            Image::allocate(width, height, format)
        }

        fn free(&mut self, image: Image) {
            self.ops.push(Op::Free(image.width(), image.height()));
        }
    }

    // ── state ─────────────────────────────────────────────────────────────

    #[test]
    fn starts_absent() {
        let depth = DepthAttachment::new();
        assert_eq!(depth.state(10, 10), AttachmentState::Absent);
        assert_eq!(depth.size(), None);
    }

    #[test]
    fn reports_stale_after_target_resize() {
        let mut depth = DepthAttachment::new();
        depth.ensure(8, 6, &mut Recording::default());
        assert_eq!(depth.state(8, 6), AttachmentState::Valid { width: 8, height: 6 });
        assert_eq!(depth.state(9, 6), AttachmentState::Stale { width: 8, height: 6 });
    }

    // ── ensure ────────────────────────────────────────────────────────────

    #[test]
    fn allocates_only_when_size_changes() {
        let mut alloc = Recording::default();
        let mut depth = DepthAttachment::new();

        let sizes = [(4, 4), (4, 4), (8, 4), (8, 4), (8, 4), (4, 4)];
        let reallocated: Vec<bool> = sizes
            .iter()
            .map(|&(w, h)| depth.ensure(w, h, &mut alloc))
            .collect();

        assert_eq!(reallocated, [true, false, true, false, false, true]);
        assert_eq!(
            alloc.ops,
            [
                Op::Alloc(4, 4),
                Op::Free(4, 4),
                Op::Alloc(8, 4),
                Op::Free(8, 4),
                Op::Alloc(4, 4),
            ]
        );
    }

    #[test]
    fn allocated_image_matches_target() {
        let mut depth = DepthAttachment::new();
        depth.ensure(3, 7, &mut Recording::default());
        let image = depth.image_mut().map(|i| (i.size(), i.format()));
        assert_eq!(image, Some(((3, 7), ImageFormat::Depth32)));
    }

    // ── release ───────────────────────────────────────────────────────────

    #[test]
    fn release_frees_exactly_once() {
        let mut alloc = Recording::default();
        let mut depth = DepthAttachment::new();
        depth.ensure(2, 2, &mut alloc);
        depth.release(&mut alloc);
        depth.release(&mut alloc);

        assert_eq!(alloc.ops, [Op::Alloc(2, 2), Op::Free(2, 2)]);
        assert_eq!(depth.state(2, 2), AttachmentState::Absent);
    }

    #[test]
    fn release_without_image_is_noop() {
        let mut alloc = Recording::default();
        DepthAttachment::new().release(&mut alloc);
        assert!(alloc.ops.is_empty());
    }
}
