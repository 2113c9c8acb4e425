use super::PackedColor;

/// Texel format of an [`Image`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// One [`PackedColor`] per texel.
    Rgba8,
    /// One `f32` depth value per texel, `0.0` near, `1.0` far.
    Depth32,
}

/// Texel storage, matching the image's format.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageData {
    Color(Vec<PackedColor>),
    Depth(Vec<f32>),
}

/// A 2D image in row-major order, origin top-left.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    width: u32,
    height: u32,
    data: ImageData,
}

impl Image {
    /// Allocates a zero-initialized image.
    pub fn allocate(width: u32, height: u32, format: ImageFormat) -> Self {
        let len = width as usize * height as usize;
        let data = match format {
            ImageFormat::Rgba8 => ImageData::Color(vec![PackedColor::TRANSPARENT; len]),
            ImageFormat::Depth32 => ImageData::Depth(vec![0.0; len]),
        };
        Self { width, height, data }
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

    pub fn format(&self) -> ImageFormat {
        match self.data {
            ImageData::Color(_) => ImageFormat::Rgba8,
            ImageData::Depth(_) => ImageFormat::Depth32,
        }
    }

    #[inline]
    pub fn data(&self) -> &ImageData {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut ImageData {
        &mut self.data
    }

    /// Color texels, or `None` for a depth image.
    pub fn colors(&self) -> Option<&[PackedColor]> {
        match &self.data {
            ImageData::Color(texels) => Some(texels),
            ImageData::Depth(_) => None,
        }
    }

    pub fn colors_mut(&mut self) -> Option<&mut [PackedColor]> {
        match &mut self.data {
            ImageData::Color(texels) => Some(texels),
            ImageData::Depth(_) => None,
        }
    }

    /// Depth texels, or `None` for a color image.
    pub fn depths(&self) -> Option<&[f32]> {
        match &self.data {
            ImageData::Depth(texels) => Some(texels),
            ImageData::Color(_) => None,
        }
    }

    pub fn depths_mut(&mut self) -> Option<&mut [f32]> {
        match &mut self.data {
            ImageData::Depth(texels) => Some(texels),
            ImageData::Color(_) => None,
        }
    }

    /// Color at `(x, y)`; `None` when out of bounds or not a color image.
    pub fn color_at(&self, x: u32, y: u32) -> Option<PackedColor> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.colors()
            .map(|texels| texels[y as usize * self.width as usize + x as usize])
    }

    /// Depth at `(x, y)`; `None` when out of bounds or not a depth image.
    pub fn depth_at(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.depths()
            .map(|texels| texels[y as usize * self.width as usize + x as usize])
    }

    /// Reallocates the image in place when its size differs; keeps the format.
    ///
    /// Returns `true` when the storage was replaced.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if self.size() == (width, height) {
            return false;
        }
        *self = Self::allocate(width, height, self.format());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_sizes_storage_to_extent() {
        let img = Image::allocate(4, 3, ImageFormat::Depth32);
        assert_eq!(img.depths().map(<[f32]>::len), Some(12));
        assert_eq!(img.format(), ImageFormat::Depth32);
        assert!(img.colors().is_none());
    }

    #[test]
    fn texel_lookup_is_row_major() {
        let mut img = Image::allocate(3, 2, ImageFormat::Rgba8);
        if let Some(texels) = img.colors_mut() {
            texels[4] = PackedColor::WHITE;
        }
        assert_eq!(img.color_at(1, 1), Some(PackedColor::WHITE));
        assert_eq!(img.color_at(3, 0), None);
    }

    #[test]
    fn resize_keeps_format_and_skips_same_size() {
        let mut img = Image::allocate(2, 2, ImageFormat::Depth32);
        assert!(!img.resize(2, 2));
        assert!(img.resize(5, 1));
        assert_eq!(img.size(), (5, 1));
        assert_eq!(img.format(), ImageFormat::Depth32);
    }
}
