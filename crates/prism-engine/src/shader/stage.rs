use bytemuck::Pod;
use glam::Vec4;

use crate::image::PackedColor;
use crate::pipeline::VertexBinding;

/// Current record of every binding for one vertex invocation.
///
/// Index `i` holds the bytes of binding `i`: the current vertex for
/// per-vertex bindings, the current instance for per-instance bindings.
#[derive(Debug, Copy, Clone)]
pub struct VertexInputs<'a> {
    records: &'a [&'a [u8]],
}

impl<'a> VertexInputs<'a> {
    pub fn new(records: &'a [&'a [u8]]) -> Self {
        Self { records }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Raw bytes of the current record of `binding`.
    #[inline]
    pub fn bytes(&self, binding: usize) -> Option<&'a [u8]> {
        self.records.get(binding).copied()
    }

    /// Reads the current record of `binding` as `T`.
    ///
    /// # Panics
    ///
    /// When `binding` is out of range or its stride is not `size_of::<T>()`.
    /// Pipelines are checked against [`VertexStage::INPUT_LAYOUT`] and draw
    /// calls against their pipeline, so this only fires when a stage reads a
    /// type other than the one its layout names.
    #[inline]
    pub fn read<T: Pod>(&self, binding: usize) -> T {
        bytemuck::pod_read_unaligned(self.records[binding])
    }
}

/// Per-invocation context: read-only uniforms and the mutable working data.
#[derive(Debug)]
pub struct ShaderContext<'a, U, W> {
    uniforms: &'a U,
    working: &'a mut W,
}

impl<'a, U, W> ShaderContext<'a, U, W> {
    pub fn new(uniforms: &'a U, working: &'a mut W) -> Self {
        Self { uniforms, working }
    }

    #[inline]
    pub fn uniforms(&self) -> &U {
        self.uniforms
    }

    #[inline]
    pub fn working(&self) -> &W {
        &*self.working
    }

    #[inline]
    pub fn working_mut(&mut self) -> &mut W {
        &mut *self.working
    }
}

/// Result of one vertex invocation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct VertexOutput<W> {
    /// Homogeneous clip-space position, before the perspective divide.
    pub clip: Vec4,
    pub working: W,
}

/// Vertex stage: per-binding records + uniforms -> clip position + working data.
pub trait VertexStage {
    /// Uniform block visible to every invocation of a draw.
    type Uniforms;

    /// Inter-stage payload handed to the fragment stage.
    type Working: Copy + Default;

    /// Bindings the stage reads, in slot order. A pipeline built for the
    /// stage must declare exactly these.
    const INPUT_LAYOUT: &'static [VertexBinding];

    fn shade(
        &self,
        inputs: &VertexInputs<'_>,
        ctx: &mut ShaderContext<'_, Self::Uniforms, Self::Working>,
    ) -> Vec4;

    /// Runs the stage with fresh working data.
    fn invoke(&self, inputs: &VertexInputs<'_>, uniforms: &Self::Uniforms) -> VertexOutput<Self::Working> {
        let mut working = Self::Working::default();
        let clip = self.shade(inputs, &mut ShaderContext::new(uniforms, &mut working));
        VertexOutput { clip, working }
    }
}

/// Fragment stage: working data -> color. Total; it cannot fail.
pub trait FragmentStage<W> {
    fn shade(&self, working: &W) -> PackedColor;
}

impl<W, F> FragmentStage<W> for F
where
    F: Fn(&W) -> PackedColor,
{
    #[inline]
    fn shade(&self, working: &W) -> PackedColor {
        self(working)
    }
}
