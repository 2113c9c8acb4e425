use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::framebuffer::ClearValue;
use crate::image::PackedColor;
use crate::math::{DEFAULT_ORBIT_RATE, DEFAULT_RADIUS_SCALE};
use crate::raster::EngineOptions;
use crate::scene::{orbiting_instances, Mesh, Scene};
use crate::time::FrameClock;
use crate::window::WindowConfig;

/// Engine configuration.
///
/// Defaults reproduce the reference scene: a 1600x900 window titled "Test",
/// six orbiting instances over a gray background.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,

    /// Debug builds run the rasterizer with optimizations off.
    pub debug: bool,

    pub clear_color: PackedColor,
    pub clear_depth: f32,

    pub instance_count: usize,

    /// Camera angular rate in radians per second.
    pub orbit_rate: f32,
    pub radius_scale: f32,

    /// Seed for instance colors; random when unset.
    pub color_seed: Option<u64>,

    /// Draw the frame-time overlay.
    pub overlay: bool,

    /// Cap on the per-frame delta fed to the camera. Unset advances by the
    /// measured wall-clock time.
    pub max_frame_delta: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: "Test".to_string(),
            width: 1600,
            height: 900,
            debug: cfg!(debug_assertions),
            clear_color: PackedColor(0x7878_78FF),
            clear_depth: 1.0,
            instance_count: 6,
            orbit_rate: DEFAULT_ORBIT_RATE,
            radius_scale: DEFAULT_RADIUS_SCALE,
            color_seed: None,
            overlay: true,
            max_frame_delta: None,
        }
    }
}

impl EngineConfig {
    pub fn window_config(&self) -> WindowConfig {
        WindowConfig {
            title: self.title.clone(),
            width: self.width,
            height: self.height,
        }
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            optimize: !self.debug,
        }
    }

    /// `[color, depth]`, matching the frame loop's attachment order.
    pub fn clear_values(&self) -> Vec<ClearValue> {
        vec![
            ClearValue::Color(self.clear_color),
            ClearValue::Depth(self.clear_depth),
        ]
    }

    pub fn frame_clock(&self) -> FrameClock {
        match self.max_frame_delta {
            Some(max) => FrameClock::with_max_delta(max),
            None => FrameClock::new(),
        }
    }

    /// `mesh` instanced on the orbit ring with colors drawn once.
    pub fn build_scene(&self, mesh: Mesh) -> Scene {
        let seed = self.color_seed.unwrap_or_else(rand::random);
        log::debug!("instance color seed: {seed}");

        let mut rng = StdRng::seed_from_u64(seed);
        Scene::new(mesh, orbiting_instances(self.instance_count, &mut rng))
    }
}
