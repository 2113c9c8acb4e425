use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use rand::{Rng, RngExt};

use crate::image::PackedColor;
use crate::math::instance_model;

/// Per-instance record: column-major model matrix plus a packed color.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Instance {
    pub model: [f32; 16],
    pub color: PackedColor,
}

impl Instance {
    pub fn new(model: Mat4, color: PackedColor) -> Self {
        Self {
            model: model.to_cols_array(),
            color,
        }
    }

    #[inline]
    pub fn model(&self) -> Mat4 {
        Mat4::from_cols_array(&self.model)
    }
}

/// Random opaque color: three random channels, alpha `0xFF`.
pub fn random_opaque_color<R: Rng + ?Sized>(rng: &mut R) -> PackedColor {
    PackedColor::opaque_rgb(rng.random(), rng.random(), rng.random())
}

/// `count` instances evenly spaced on the orbit ring, each with a random
/// opaque color drawn once here.
pub fn orbiting_instances<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Instance> {
    (0..count)
        .map(|i| Instance::new(instance_model(i, count), random_opaque_color(rng)))
        .collect()
}
