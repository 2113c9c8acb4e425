use glam::Mat4;

/// Per-frame uniform data read by the vertex stage.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Uniforms {
    pub projection: Mat4,
    pub view: Mat4,
}

impl Default for Uniforms {
    fn default() -> Self {
        Self {
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
        }
    }
}
