use std::f32::consts::FRAC_PI_4;

use glam::{Mat4, Vec3};

/// Camera angular rate in radians per second.
pub const DEFAULT_ORBIT_RATE: f32 = 0.1;

/// Eye distance at `theta = 0`; the radius is `|cos(theta)| * scale`.
pub const DEFAULT_RADIUS_SCALE: f32 = 5.0;

/// Camera pose derived for one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraPose {
    /// Azimuth used for this frame.
    pub theta: f32,
    /// Elevation, `cos(theta) * π/4`.
    pub phi: f32,
    pub eye: Vec3,
    pub view: Mat4,
}

/// Orbit camera circling the origin.
///
/// The camera keeps a pure accumulator (no wrap to `2π`). A frame renders
/// with the angle held at frame start; the accumulator advances afterwards.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    angle: f32,
    rate: f32,
    radius_scale: f32,
}

impl OrbitCamera {
    pub fn new(rate: f32, radius_scale: f32) -> Self {
        Self {
            angle: 0.0,
            rate,
            radius_scale,
        }
    }

    /// Current accumulated angle (the one the next frame renders with).
    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    #[inline]
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Returns the pose for the current angle, then advances by `dt * rate`.
    pub fn advance(&mut self, dt: f32) -> CameraPose {
        let pose = self.pose();
        self.angle += dt * self.rate;
        pose
    }

    /// Pose for the current angle without advancing.
    pub fn pose(&self) -> CameraPose {
        let theta = self.angle;
        let (sin_theta, cos_theta) = theta.sin_cos();

        let phi = cos_theta * FRAC_PI_4;
        let (sin_phi, cos_phi) = phi.sin_cos();

        let radius = cos_theta.abs() * self.radius_scale;
        let eye = radius * Vec3::new(cos_phi * cos_theta, sin_phi, cos_phi * sin_theta);

        CameraPose {
            theta,
            phi,
            eye,
            view: look_at_origin(eye),
        }
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(DEFAULT_ORBIT_RATE, DEFAULT_RADIUS_SCALE)
    }
}

/// `look_at_rh(eye, 0, +Y)`; identity when the eye sits on the target.
fn look_at_origin(eye: Vec3) -> Mat4 {
    if eye.length_squared() < 1e-12 {
        return Mat4::IDENTITY;
    }
    Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y)
}
