use anyhow::{Context, Result};
use wgpu::{SurfaceError, TextureFormat};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::image::{Image, PackedColor};

/// Knobs for opening the presentation device.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// FIFO (vsync) unless the caller asks otherwise.
    pub present_mode: wgpu::PresentMode,
    /// Ignored when the surface does not list it.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,
    pub power_preference: wgpu::PowerPreference,
    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,
    /// Frames the surface may queue ahead; a hint.
    pub max_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            power_preference: wgpu::PowerPreference::LowPower,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults(),
            max_frame_latency: 2,
        }
    }
}

/// What the caller should do after a failed present.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// The surface was configured again; the next frame may present.
    Reconfigured,
    /// Drop this frame and carry on.
    SkipFrame,
    /// Presenting cannot continue.
    Fatal,
}

/// Byte layout of one surface texel.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum TexelLayout {
    Rgba,
    Bgra,
}

impl TexelLayout {
    /// Surface formats a packed color can be copied into without conversion
    /// beyond a channel swizzle, most preferred first.
    const CANDIDATES: [(TextureFormat, TexelLayout); 4] = [
        (TextureFormat::Bgra8Unorm, TexelLayout::Bgra),
        (TextureFormat::Rgba8Unorm, TexelLayout::Rgba),
        (TextureFormat::Bgra8UnormSrgb, TexelLayout::Bgra),
        (TextureFormat::Rgba8UnormSrgb, TexelLayout::Rgba),
    ];

    fn pick(available: &[TextureFormat]) -> Option<(TextureFormat, TexelLayout)> {
        Self::CANDIDATES
            .into_iter()
            .find(|(format, _)| available.contains(format))
    }

    fn encode(self, color: PackedColor) -> [u8; 4] {
        match self {
            TexelLayout::Rgba => color.to_rgba_bytes(),
            TexelLayout::Bgra => color.to_bgra_bytes(),
        }
    }
}

/// Presentation device for one window.
///
/// Frames are rendered on the CPU. [`present`](Self::present) copies a color
/// image into the swapchain texture, so the surface is configured with
/// `COPY_DST` usage and no render pass is ever recorded.
pub struct Gpu<'w> {
    /// Borrows the window; the window outlives the `Gpu`.
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    layout: TexelLayout,
    size: PhysicalSize<u32>,
    upload: Vec<u8>,
}

impl<'w> Gpu<'w> {
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no GPU adapter can present to this window")?;

        let info = adapter.get_info();
        log::info!("presenting through {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("prism present device"),
                required_features: init.required_features,
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let caps = surface.get_capabilities(&adapter);
        anyhow::ensure!(
            caps.usages.contains(wgpu::TextureUsages::COPY_DST),
            "surface does not accept copy uploads"
        );
        let (format, layout) =
            TexelLayout::pick(&caps.formats).context("surface offers no 8-bit RGBA/BGRA format")?;

        let alpha_mode = match init.alpha_mode {
            Some(mode) if caps.alpha_modes.contains(&mode) => mode,
            _ => caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_DST,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: init.present_mode,
            alpha_mode,
            view_formats: Vec::new(),
            desired_maximum_frame_latency: init.max_frame_latency,
        };

        let gpu = Self {
            surface,
            device,
            queue,
            config,
            layout,
            size,
            upload: Vec::new(),
        };
        gpu.configure();
        Ok(gpu)
    }

    pub fn surface_format(&self) -> TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    fn is_zero_sized(&self) -> bool {
        self.size.width == 0 || self.size.height == 0
    }

    /// Applies the stored configuration; a 0x0 surface stays unconfigured.
    fn configure(&self) {
        if !self.is_zero_sized() {
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Tracks a window resize. Configuration is deferred while minimized.
    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.size = size;
        if self.is_zero_sized() {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.configure();
    }

    /// Copies `image` into the next swapchain texture and presents it.
    ///
    /// Nothing is presented while minimized, for non-color images, or when
    /// the image and the swapchain texture disagree on size (a resize is
    /// still in flight).
    pub fn present(&mut self, image: &Image) -> Result<(), SurfaceError> {
        if self.is_zero_sized() {
            return Ok(());
        }
        let Some(texels) = image.colors() else {
            return Ok(());
        };

        let frame = self.surface.get_current_texture()?;
        let extent = frame.texture.size();
        if (extent.width, extent.height) != image.size() {
            log::trace!(
                "dropping {}x{} frame for a {}x{} swapchain",
                image.width(),
                image.height(),
                extent.width,
                extent.height
            );
            return Ok(());
        }

        let layout = self.layout;
        self.upload.clear();
        self.upload
            .extend(texels.iter().flat_map(|&color| layout.encode(color)));

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &frame.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &self.upload,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * extent.width),
                rows_per_image: Some(extent.height),
            },
            extent,
        );
        self.queue.submit(std::iter::empty());
        frame.present();
        Ok(())
    }

    /// Decides how to continue after `present` failed.
    pub fn handle_surface_error(&mut self, err: SurfaceError) -> SurfaceErrorAction {
        match err {
            SurfaceError::Lost | SurfaceError::Outdated => {
                self.configure();
                SurfaceErrorAction::Reconfigured
            }
            SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
            SurfaceError::Timeout | SurfaceError::Other => SurfaceErrorAction::SkipFrame,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_linear_bgra() {
        let available = [TextureFormat::Rgba8UnormSrgb, TextureFormat::Bgra8Unorm];
        assert_eq!(
            TexelLayout::pick(&available),
            Some((TextureFormat::Bgra8Unorm, TexelLayout::Bgra))
        );
    }

    #[test]
    fn rejects_surfaces_without_8bit_color() {
        assert_eq!(TexelLayout::pick(&[TextureFormat::Rgba16Float]), None);
    }

    #[test]
    fn encodes_channels_in_surface_order() {
        let color = PackedColor(0x1122_3344);
        assert_eq!(TexelLayout::Rgba.encode(color), [0x11, 0x22, 0x33, 0x44]);
        assert_eq!(TexelLayout::Bgra.encode(color), [0x33, 0x22, 0x11, 0x44]);
    }
}
