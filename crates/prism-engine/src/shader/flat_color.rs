use glam::Vec4;

use crate::image::PackedColor;
use crate::math::clip_position;
use crate::pipeline::VertexBinding;
use crate::scene::{Instance, Uniforms, Vertex};

use super::{FragmentStage, ShaderContext, VertexInputs, VertexStage};

/// Binding slot of the per-vertex [`Vertex`] stream.
pub const VERTEX_BINDING: usize = 0;

/// Binding slot of the per-instance [`Instance`] stream.
pub const INSTANCE_BINDING: usize = 1;

/// Transforms by `projection * view * model` and forwards the instance color.
#[derive(Debug, Default, Copy, Clone)]
pub struct InstanceColorVertex;

impl VertexStage for InstanceColorVertex {
    type Uniforms = Uniforms;
    type Working = PackedColor;

    const INPUT_LAYOUT: &'static [VertexBinding] = &[
        VertexBinding::per_vertex::<Vertex>(),
        VertexBinding::per_instance::<Instance>(),
    ];

    fn shade(
        &self,
        inputs: &VertexInputs<'_>,
        ctx: &mut ShaderContext<'_, Uniforms, PackedColor>,
    ) -> Vec4 {
        let vertex: Vertex = inputs.read(VERTEX_BINDING);
        let instance: Instance = inputs.read(INSTANCE_BINDING);

        *ctx.working_mut() = instance.color;

        let uniforms = ctx.uniforms();
        clip_position(&uniforms.projection, &uniforms.view, &instance.model(), vertex.position())
    }
}

/// Outputs the working-data color unchanged.
#[derive(Debug, Default, Copy, Clone)]
pub struct FlatColorFragment;

impl FragmentStage<PackedColor> for FlatColorFragment {
    #[inline]
    fn shade(&self, working: &PackedColor) -> PackedColor {
        *working
    }
}
