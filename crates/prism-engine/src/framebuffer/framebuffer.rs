use crate::image::{Image, ImageData, ImageFormat, PackedColor};

/// Value an attachment is cleared to; one per attachment, in order.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ClearValue {
    Color(PackedColor),
    Depth(f32),
}

impl ClearValue {
    /// Format this value can clear.
    pub fn format(self) -> ImageFormat {
        match self {
            ClearValue::Color(_) => ImageFormat::Rgba8,
            ClearValue::Depth(_) => ImageFormat::Depth32,
        }
    }

    /// Fills `image`. Returns `false` (and leaves the image untouched) when
    /// the value does not match the image format.
    pub fn apply(self, image: &mut Image) -> bool {
        match (self, image.data_mut()) {
            (ClearValue::Color(color), ImageData::Color(texels)) => {
                texels.fill(color);
                true
            }
            (ClearValue::Depth(depth), ImageData::Depth(texels)) => {
                texels.fill(depth);
                true
            }
            _ => false,
        }
    }
}

/// Ordered attachments plus the current render extent.
///
/// Attachments are borrowed for the frame; the framebuffer never owns the
/// images it renders into.
#[derive(Debug)]
pub struct Framebuffer<'a> {
    width: u32,
    height: u32,
    attachments: Vec<&'a mut Image>,
}

impl<'a> Framebuffer<'a> {
    pub fn new(width: u32, height: u32, attachments: Vec<&'a mut Image>) -> Self {
        Self {
            width,
            height,
            attachments,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn attachment_count(&self) -> usize {
        self.attachments.len()
    }

    pub fn attachment(&self, index: usize) -> Option<&Image> {
        self.attachments.get(index).map(|image| &**image)
    }

    pub fn attachments(&self) -> impl Iterator<Item = &Image> {
        self.attachments.iter().map(|image| &**image)
    }

    pub fn attachments_mut(&mut self) -> impl Iterator<Item = &mut Image> {
        self.attachments.iter_mut().map(|image| &mut **image)
    }

    /// First color attachment.
    pub fn color_mut(&mut self) -> Option<&mut Image> {
        self.attachments_mut()
            .find(|image| image.format() == ImageFormat::Rgba8)
    }

    /// First color and first depth attachment, borrowed together.
    pub fn targets_mut(&mut self) -> (Option<&mut Image>, Option<&mut Image>) {
        let mut color = None;
        let mut depth = None;
        for image in self.attachments.iter_mut() {
            match image.format() {
                ImageFormat::Rgba8 if color.is_none() => color = Some(&mut **image),
                ImageFormat::Depth32 if depth.is_none() => depth = Some(&mut **image),
                _ => {}
            }
        }
        (color, depth)
    }
}
