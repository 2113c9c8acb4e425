use std::collections::VecDeque;
use std::rc::Rc;

use crate::frame::FrameReport;
use crate::framebuffer::Framebuffer;
use crate::image::PackedColor;
use crate::raster::{RasterEngine, Rasterizer};

use super::Overlay;

/// Axis-aligned rectangle in framebuffer pixels, origin top-left.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct OverlayRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub color: PackedColor,
}

const HISTORY: usize = 120;
const BAR_WIDTH: u32 = 2;
const GRAPH_HEIGHT: u32 = 48;
const MARGIN: u32 = 8;

/// Frame time corresponding to a full-height bar (1/30 s).
const FULL_SCALE_DT: f32 = 1.0 / 30.0;

const PANEL: PackedColor = PackedColor(0x000000A0);
const BAR_OK: PackedColor = PackedColor(0x4CD964E0);
const BAR_SLOW: PackedColor = PackedColor(0xFF3B30E0);
const TARGET_LINE: PackedColor = PackedColor(0xFFFFFF80);

/// Frame-time graph in the top-left corner.
///
/// Keeps the rasterizer alive for as long as the overlay exists.
pub struct FrameStatsOverlay<E: RasterEngine> {
    _rasterizer: Rc<Rasterizer<E>>,
    history: VecDeque<f32>,
    draw_data: Vec<OverlayRect>,
}

impl<E: RasterEngine> FrameStatsOverlay<E> {
    pub fn new(rasterizer: Rc<Rasterizer<E>>) -> Self {
        log::info!("overlay renderer initialized");
        Self {
            _rasterizer: rasterizer,
            history: VecDeque::with_capacity(HISTORY),
            draw_data: Vec::new(),
        }
    }

    /// Draw data built by the last [`Overlay::begin_frame`].
    pub fn draw_data(&self) -> &[OverlayRect] {
        &self.draw_data
    }

    fn build_draw_data(&mut self) {
        self.draw_data.clear();

        let panel_width = HISTORY as u32 * BAR_WIDTH;
        self.draw_data.push(OverlayRect {
            x: MARGIN,
            y: MARGIN,
            width: panel_width,
            height: GRAPH_HEIGHT,
            color: PANEL,
        });

        let baseline = MARGIN + GRAPH_HEIGHT;
        for (i, &dt) in self.history.iter().enumerate() {
            let ratio = (dt / FULL_SCALE_DT).clamp(0.0, 1.0);
            let height = ((ratio * GRAPH_HEIGHT as f32).round() as u32).max(1);
            self.draw_data.push(OverlayRect {
                x: MARGIN + i as u32 * BAR_WIDTH,
                y: baseline - height,
                width: BAR_WIDTH,
                height,
                color: if dt > FULL_SCALE_DT / 2.0 { BAR_SLOW } else { BAR_OK },
            });
        }

        // 60 Hz reference line.
        self.draw_data.push(OverlayRect {
            x: MARGIN,
            y: baseline - GRAPH_HEIGHT / 2,
            width: panel_width,
            height: 1,
            color: TARGET_LINE,
        });
    }
}

impl<E: RasterEngine> Overlay for FrameStatsOverlay<E> {
    fn begin_frame(&mut self, previous: Option<&FrameReport>) {
        if let Some(report) = previous {
            if self.history.len() == HISTORY {
                self.history.pop_front();
            }
            self.history.push_back(report.dt);
        }
        self.build_draw_data();
    }

    fn render(&mut self, framebuffer: &mut Framebuffer<'_>) {
        let Some(color) = framebuffer.color_mut() else {
            return;
        };
        let (width, height) = color.size();
        let Some(texels) = color.colors_mut() else {
            return;
        };

        for rect in &self.draw_data {
            let x1 = rect.x.saturating_add(rect.width).min(width);
            let y1 = rect.y.saturating_add(rect.height).min(height);
            for y in rect.y.min(y1)..y1 {
                let row = y as usize * width as usize;
                for x in rect.x.min(x1)..x1 {
                    let texel = &mut texels[row + x as usize];
                    *texel = rect.color.over(*texel);
                }
            }
        }
    }
}

impl<E: RasterEngine> Drop for FrameStatsOverlay<E> {
    fn drop(&mut self) {
        log::info!("overlay renderer shut down");
    }
}
