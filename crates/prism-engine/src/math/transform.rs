use std::f32::consts::TAU;

use glam::{Mat4, Vec3, Vec4};

/// Uniform scale applied to every orbiting instance.
pub const INSTANCE_SCALE: f32 = 0.25;

/// Offset of each instance, expressed in its own rotated frame.
pub const INSTANCE_OFFSET: Vec3 = Vec3::new(0.0, 0.0, -0.5);

pub const FOV_Y_DEGREES: f32 = 45.0;
pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 100.0;

/// Model matrix of instance `index` out of `count` evenly spaced around +Y.
///
/// `scale * rotation_y(2π·i/N) * translation(INSTANCE_OFFSET)`: the offset is
/// applied in the rotated frame, which places the instances on a ring.
pub fn instance_model(index: usize, count: usize) -> Mat4 {
    debug_assert!(index < count.max(1));
    let theta = TAU * index as f32 / count.max(1) as f32;

    Mat4::from_scale(Vec3::splat(INSTANCE_SCALE))
        * Mat4::from_rotation_y(theta)
        * Mat4::from_translation(INSTANCE_OFFSET)
}

/// Perspective projection for a `width × height` target.
///
/// A zero-height target (minimized window) is treated as square so the
/// matrix stays finite.
pub fn projection(width: u32, height: u32) -> Mat4 {
    let aspect = if width == 0 || height == 0 {
        1.0
    } else {
        width as f32 / height as f32
    };

    Mat4::perspective_rh(FOV_Y_DEGREES.to_radians(), aspect, NEAR_PLANE, FAR_PLANE)
}

/// `projection * view * model * [position, 1]`.
#[inline]
pub fn clip_position(projection: &Mat4, view: &Mat4, model: &Mat4, position: Vec3) -> Vec4 {
    *projection * (*view * (*model * position.extend(1.0)))
}
