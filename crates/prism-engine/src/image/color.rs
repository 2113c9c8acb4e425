use bytemuck::{Pod, Zeroable};

/// 32-bit packed color, `0xRRGGBBAA`.
///
/// `0x787878FF` is opaque mid gray. Channels are straight (not premultiplied).
#[repr(transparent)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct PackedColor(pub u32);

impl PackedColor {
    pub const BLACK: Self = Self(0x0000_00FF);
    pub const WHITE: Self = Self(0xFFFF_FFFF);
    pub const TRANSPARENT: Self = Self(0);

    #[inline]
    pub const fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self((r as u32) << 24 | (g as u32) << 16 | (b as u32) << 8 | a as u32)
    }

    /// Opaque color from three channels; the alpha byte is set to `0xFF`.
    #[inline]
    pub const fn opaque_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgba8(r, g, b, 0xFF)
    }

    #[inline]
    pub const fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[inline]
    pub const fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub const fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn a(self) -> u8 {
        self.0 as u8
    }

    /// Bytes in `[r, g, b, a]` memory order.
    #[inline]
    pub const fn to_rgba_bytes(self) -> [u8; 4] {
        [self.r(), self.g(), self.b(), self.a()]
    }

    /// Bytes in `[b, g, r, a]` memory order.
    #[inline]
    pub const fn to_bgra_bytes(self) -> [u8; 4] {
        [self.b(), self.g(), self.r(), self.a()]
    }

    /// Source-over blend of `self` on top of `dst`, ignoring `dst` alpha.
    pub fn over(self, dst: Self) -> Self {
        let a = self.a() as u32;
        let mix = |s: u8, d: u8| ((s as u32 * a + d as u32 * (255 - a) + 127) / 255) as u8;
        Self::opaque_rgb(mix(self.r(), dst.r()), mix(self.g(), dst.g()), mix(self.b(), dst.b()))
    }
}

impl From<u32> for PackedColor {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_follow_rgba_order() {
        let c = PackedColor(0xFFCC9966);
        assert_eq!((c.r(), c.g(), c.b(), c.a()), (0xFF, 0xCC, 0x99, 0x66));
        assert_eq!(PackedColor::from_rgba8(0xFF, 0xCC, 0x99, 0x66), c);
    }

    #[test]
    fn background_gray_is_opaque() {
        let c = PackedColor(0x787878FF);
        assert_eq!(c, PackedColor::opaque_rgb(0x78, 0x78, 0x78));
        assert_eq!(c.to_bgra_bytes(), [0x78, 0x78, 0x78, 0xFF]);
    }

    #[test]
    fn over_with_opaque_source_replaces_destination() {
        let src = PackedColor::opaque_rgb(10, 20, 30);
        assert_eq!(src.over(PackedColor::WHITE), src);
    }

    #[test]
    fn over_with_transparent_source_keeps_destination() {
        let dst = PackedColor::opaque_rgb(1, 2, 3);
        assert_eq!(PackedColor::TRANSPARENT.over(dst), dst);
    }
}
