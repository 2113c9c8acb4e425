//! Scene data fed to the instanced draw: mesh, per-instance records, uniforms.

mod instance;
mod mesh;
mod uniforms;

pub use instance::{orbiting_instances, random_opaque_color, Instance};
pub use mesh::{Mesh, Vertex};
pub use uniforms::Uniforms;

/// Everything the frame loop draws: one mesh, instanced.
#[derive(Debug, Clone)]
pub struct Scene {
    pub mesh: Mesh,
    pub instances: Vec<Instance>,
}

impl Scene {
    pub fn new(mesh: Mesh, instances: Vec<Instance>) -> Self {
        Self { mesh, instances }
    }
}
