use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use ouroboros::self_referencing;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window as WinitWindow, WindowId};

use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::image::{Image, ImageFormat};

use super::{FrameSurface, WindowConfig};

/// Pumps allowed for the platform to deliver `resumed` at startup.
const STARTUP_PUMPS: usize = 32;
const STARTUP_PUMP_TIMEOUT: Duration = Duration::from_millis(10);

#[self_referencing]
struct Presenter {
    window: WinitWindow,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

/// Receives winit callbacks during a pump.
struct Handler {
    config: WindowConfig,
    gpu_init: GpuInit,
    presenter: Option<Presenter>,
    size: PhysicalSize<u32>,
    close_requested: bool,
    error: Option<anyhow::Error>,
}

impl Handler {
    fn create_presenter(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = WinitWindow::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(
                f64::from(self.config.width),
                f64::from(self.config.height),
            ));

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let presenter = Presenter::try_new(window, |window| {
            pollster::block_on(Gpu::new(window, gpu_init))
        })
        .context("GPU initialization failed for window")?;

        self.size = presenter.borrow_window().inner_size();
        log::info!(
            "window \"{}\" created ({}x{}, {:?})",
            self.config.title,
            self.size.width,
            self.size.height,
            presenter.borrow_gpu().surface_format()
        );

        self.presenter = Some(presenter);
        Ok(())
    }
}

impl ApplicationHandler for Handler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.presenter.is_some() {
            return;
        }

        if let Err(e) = self.create_presenter(event_loop) {
            log::error!("failed to create window: {e:#}");
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("close requested");
                self.close_requested = true;
            }
            WindowEvent::Resized(size) => {
                self.size = size;
                if let Some(presenter) = self.presenter.as_mut() {
                    presenter.with_gpu_mut(|gpu| gpu.resize(size));
                }
            }
            _ => {}
        }
    }
}

/// Native window presenting a CPU backbuffer.
///
/// The event loop is pumped from [`FrameSurface::poll`] so the frame loop
/// keeps control of the thread.
pub struct Window {
    handler: Handler,
    backbuffer: Image,
    event_loop: EventLoop<()>,
}

impl Window {
    /// Opens the window and its GPU surface.
    ///
    /// Fails when the event loop, the window, or the GPU surface cannot be
    /// created; no handle is returned in that case.
    pub fn new(config: &WindowConfig, gpu_init: GpuInit) -> Result<Self> {
        let mut event_loop = EventLoop::new().context("failed to create winit EventLoop")?;

        let mut handler = Handler {
            config: config.clone(),
            gpu_init,
            presenter: None,
            size: PhysicalSize::new(config.width, config.height),
            close_requested: false,
            error: None,
        };

        for _ in 0..STARTUP_PUMPS {
            let status = event_loop.pump_app_events(Some(STARTUP_PUMP_TIMEOUT), &mut handler);
            if let Some(e) = handler.error.take() {
                return Err(e);
            }
            if let PumpStatus::Exit(code) = status {
                bail!("event loop exited with code {code} before the window was created");
            }
            if handler.presenter.is_some() {
                break;
            }
        }

        if handler.presenter.is_none() {
            bail!("platform never resumed; window was not created");
        }

        let backbuffer = Image::allocate(handler.size.width, handler.size.height, ImageFormat::Rgba8);

        Ok(Self {
            handler,
            backbuffer,
            event_loop,
        })
    }
}

impl FrameSurface for Window {
    fn poll(&mut self) {
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.handler);

        if let PumpStatus::Exit(code) = status {
            log::info!("event loop exited with code {code}");
            self.handler.close_requested = true;
        }
    }

    fn is_close_requested(&self) -> bool {
        self.handler.close_requested
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        (self.handler.size.width, self.handler.size.height)
    }

    fn backbuffer(&mut self) -> &mut Image {
        let (width, height) = self.framebuffer_size();
        if self.backbuffer.resize(width, height) {
            log::trace!("backbuffer resized to {width}x{height}");
        }
        &mut self.backbuffer
    }

    fn swap_buffers(&mut self) -> Result<()> {
        let Some(presenter) = self.handler.presenter.as_mut() else {
            return Ok(());
        };
        let image = &self.backbuffer;

        presenter.with_gpu_mut(|gpu| match gpu.present(image) {
            Ok(()) => Ok(()),
            Err(err) => {
                let message = err.to_string();
                match gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                        log::warn!("frame skipped: {message}");
                        Ok(())
                    }
                    SurfaceErrorAction::Fatal => Err(anyhow!("surface error: {message}")),
                }
            }
        })
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        log::info!("window destroyed");
    }
}
