use crate::framebuffer::{ClearValue, Framebuffer};
use crate::pipeline::DrawCall;
use crate::shader::{FragmentStage, VertexStage};

use super::RenderError;

/// Engine creation options.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Skip per-vertex output validation. Debug builds run with this off.
    pub optimize: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            optimize: !cfg!(debug_assertions),
        }
    }
}

/// A rasterization engine.
///
/// Implementations receive only well-formed input: clears are validated by
/// [`Rasterizer::clear_framebuffer`] and draw calls by
/// [`DrawCallBuilder::build`](crate::pipeline::DrawCallBuilder::build).
pub trait RasterEngine {
    /// Fills attachment `i` with `values[i]`.
    fn clear(&self, framebuffer: &mut Framebuffer<'_>, values: &[ClearValue]);

    /// Rasterizes every instance of the indexed draw into its framebuffer.
    fn render_indexed<V, F>(&self, call: DrawCall<'_, '_, V, F>)
    where
        V: VertexStage,
        F: FragmentStage<V::Working>;
}

/// Shared front end over a [`RasterEngine`].
///
/// Hold it in an `Rc`: the frame loop and the overlay both keep it alive, and
/// the engine is torn down when the last holder releases it.
#[derive(Debug)]
pub struct Rasterizer<E: RasterEngine> {
    engine: E,
}

impl<E: RasterEngine> Rasterizer<E> {
    pub fn new(engine: E) -> Self {
        log::info!("rasterizer created");
        Self { engine }
    }

    #[inline]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Clears every attachment of `framebuffer`.
    ///
    /// Fails without touching any attachment when the number of values does
    /// not match the attachment count, when a value does not fit its
    /// attachment's format, or when an attachment does not cover the
    /// framebuffer extent.
    pub fn clear_framebuffer(
        &self,
        framebuffer: &mut Framebuffer<'_>,
        values: &[ClearValue],
    ) -> Result<(), RenderError> {
        if values.len() != framebuffer.attachment_count() {
            return Err(RenderError::AttachmentCountMismatch {
                expected: framebuffer.attachment_count(),
                actual: values.len(),
            });
        }

        let extent = framebuffer.size();
        for (attachment, (image, value)) in framebuffer.attachments().zip(values).enumerate() {
            if image.format() != value.format() {
                return Err(RenderError::ClearValueFormat {
                    attachment,
                    value: value.format(),
                    attachment_format: image.format(),
                });
            }
            if image.size() != extent {
                return Err(RenderError::AttachmentExtent {
                    attachment,
                    expected: extent,
                    actual: image.size(),
                });
            }
        }

        self.engine.clear(framebuffer, values);
        Ok(())
    }

    /// Hands a validated draw call to the engine.
    #[inline]
    pub fn render_indexed<V, F>(&self, call: DrawCall<'_, '_, V, F>)
    where
        V: VertexStage,
        F: FragmentStage<V::Working>,
    {
        self.engine.render_indexed(call);
    }
}

impl<E: RasterEngine> Drop for Rasterizer<E> {
    fn drop(&mut self) {
        log::info!("rasterizer destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{Image, ImageFormat, PackedColor};
    use crate::raster::SoftwareRasterizer;

    fn rasterizer() -> Rasterizer<SoftwareRasterizer> {
        Rasterizer::new(SoftwareRasterizer::new(EngineOptions::default()))
    }

    #[test]
    fn clear_fills_every_attachment() {
        let mut color = Image::allocate(2, 2, ImageFormat::Rgba8);
        let mut depth = Image::allocate(2, 2, ImageFormat::Depth32);
        let mut fb = Framebuffer::new(2, 2, vec![&mut color, &mut depth]);

        let values = [ClearValue::Color(PackedColor(0x787878FF)), ClearValue::Depth(1.0)];
        rasterizer().clear_framebuffer(&mut fb, &values).unwrap();
        drop(fb);

        assert!(color.colors().unwrap().iter().all(|&c| c == PackedColor(0x787878FF)));
        assert!(depth.depths().unwrap().iter().all(|&d| d == 1.0));
    }

    #[test]
    fn count_mismatch_fails_without_writing() {
        let mut color = Image::allocate(2, 2, ImageFormat::Rgba8);
        let mut depth = Image::allocate(2, 2, ImageFormat::Depth32);
        let before = (color.clone(), depth.clone());
        let mut fb = Framebuffer::new(2, 2, vec![&mut color, &mut depth]);

        let rast = rasterizer();
        for values in [
            &[][..],
            &[ClearValue::Color(PackedColor::WHITE)][..],
            &[ClearValue::Color(PackedColor::WHITE), ClearValue::Depth(1.0), ClearValue::Depth(0.5)][..],
        ] {
            let err = rast.clear_framebuffer(&mut fb, values).unwrap_err();
            assert_eq!(
                err,
                RenderError::AttachmentCountMismatch { expected: 2, actual: values.len() }
            );
        }
        drop(fb);

        assert_eq!((color, depth), before);
    }

    #[test]
    fn swapped_values_fail_on_format() {
        let mut color = Image::allocate(1, 1, ImageFormat::Rgba8);
        let mut depth = Image::allocate(1, 1, ImageFormat::Depth32);
        let mut fb = Framebuffer::new(1, 1, vec![&mut color, &mut depth]);

        let values = [ClearValue::Depth(1.0), ClearValue::Color(PackedColor::WHITE)];
        let err = rasterizer().clear_framebuffer(&mut fb, &values).unwrap_err();
        assert!(matches!(err, RenderError::ClearValueFormat { attachment: 0, .. }));
    }

    #[test]
    fn undersized_attachment_is_rejected() {
        let mut color = Image::allocate(4, 4, ImageFormat::Rgba8);
        let mut depth = Image::allocate(2, 2, ImageFormat::Depth32);
        let mut fb = Framebuffer::new(4, 4, vec![&mut color, &mut depth]);

        let values = [ClearValue::Color(PackedColor::WHITE), ClearValue::Depth(1.0)];
        let err = rasterizer().clear_framebuffer(&mut fb, &values).unwrap_err();
        assert_eq!(
            err,
            RenderError::AttachmentExtent { attachment: 1, expected: (4, 4), actual: (2, 2) }
        );
    }
}
