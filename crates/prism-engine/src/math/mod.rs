//! Transform math.
//!
//! Conventions (glam):
//! - column vectors, `M * v`; composition `A * B` applies `B` first
//! - right-handed view space, camera looks down -Z
//! - clip-space depth in `[0, 1]` after the perspective divide

mod camera;
mod transform;

pub use camera::{CameraPose, OrbitCamera, DEFAULT_ORBIT_RATE, DEFAULT_RADIUS_SCALE};
pub use transform::{
    clip_position, instance_model, projection, INSTANCE_OFFSET, INSTANCE_SCALE, FAR_PLANE,
    FOV_Y_DEGREES, NEAR_PLANE,
};
