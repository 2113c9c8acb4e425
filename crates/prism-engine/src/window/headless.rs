use anyhow::Result;

use crate::image::{Image, ImageFormat};

use super::FrameSurface;

/// Offscreen surface. Presenting only counts frames.
///
/// With a frame limit, a close is requested once that many frames have been
/// presented; a limit of zero starts closed.
#[derive(Debug)]
pub struct HeadlessSurface {
    width: u32,
    height: u32,
    frame_limit: Option<u64>,
    presented: u64,
    polls: u64,
    close_requested: bool,
    backbuffer: Image,
}

impl HeadlessSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frame_limit: None,
            presented: 0,
            polls: 0,
            close_requested: false,
            backbuffer: Image::allocate(width, height, ImageFormat::Rgba8),
        }
    }

    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self.close_requested = frames == 0;
        self
    }

    /// Simulates a resize; takes effect at the next `framebuffer_size`.
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }

    /// Last rendered frame.
    pub fn frame(&self) -> &Image {
        &self.backbuffer
    }
}

impl FrameSurface for HeadlessSurface {
    fn poll(&mut self) {
        self.polls += 1;
    }

    fn is_close_requested(&self) -> bool {
        self.close_requested
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn backbuffer(&mut self) -> &mut Image {
        self.backbuffer.resize(self.width, self.height);
        &mut self.backbuffer
    }

    fn swap_buffers(&mut self) -> Result<()> {
        self.presented += 1;
        if self.frame_limit.is_some_and(|limit| self.presented >= limit) {
            self.close_requested = true;
        }
        Ok(())
    }
}
