use bytemuck::Pod;

use crate::shader::{FragmentStage, VertexStage};

use super::PipelineError;

/// Upper bound on bindings per pipeline; vertex inputs are gathered on the stack.
pub const MAX_VERTEX_BINDINGS: usize = 8;

/// How a binding advances across invocations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum InputRate {
    /// One record per vertex index.
    Vertex,
    /// One record per instance.
    Instance,
}

/// One vertex-data source of a pipeline.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct VertexBinding {
    pub stride: usize,
    pub input_rate: InputRate,
}

impl VertexBinding {
    /// Per-vertex binding of `T` records.
    pub const fn per_vertex<T: Pod>() -> Self {
        Self {
            stride: size_of::<T>(),
            input_rate: InputRate::Vertex,
        }
    }

    /// Per-instance binding of `T` records.
    pub const fn per_instance<T: Pod>() -> Self {
        Self {
            stride: size_of::<T>(),
            input_rate: InputRate::Instance,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum CullMode {
    #[default]
    None,
    Front,
    Back,
}

/// Winding of front-facing primitives, as seen in normalized device space
/// (+Y up).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum FrontFace {
    #[default]
    CounterClockwise,
    Clockwise,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum Topology {
    #[default]
    TriangleList,
    TriangleStrip,
}

impl Topology {
    /// Number of primitives formed by `index_count` indices, or `None` when
    /// the count leaves a partial primitive.
    pub fn primitive_count(self, index_count: u32) -> Option<u32> {
        match self {
            Topology::TriangleList => (index_count % 3 == 0).then_some(index_count / 3),
            Topology::TriangleStrip => match index_count {
                0 => Some(0),
                1 | 2 => None,
                n => Some(n - 2),
            },
        }
    }

    /// Positions in the index buffer of primitive `primitive`, in winding order.
    pub fn primitive_indices(self, primitive: u32) -> [usize; 3] {
        let p = primitive as usize;
        match self {
            Topology::TriangleList => [3 * p, 3 * p + 1, 3 * p + 2],
            // Odd strip triangles swap their first two vertices to keep winding.
            Topology::TriangleStrip if p % 2 == 1 => [p + 1, p, p + 2],
            Topology::TriangleStrip => [p, p + 1, p + 2],
        }
    }
}

/// Which vertex of a primitive supplies the working data for all of its
/// fragments. Working data is never interpolated.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum ProvokingVertex {
    #[default]
    First,
    Last,
}

impl ProvokingVertex {
    #[inline]
    pub fn select<T>(self, [first, _, last]: [T; 3]) -> T {
        match self {
            ProvokingVertex::First => first,
            ProvokingVertex::Last => last,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DepthState {
    pub test: bool,
    pub write: bool,
}

impl Default for DepthState {
    fn default() -> Self {
        Self {
            test: true,
            write: true,
        }
    }
}

/// Immutable pipeline configuration handed to the rasterizer.
///
/// The stage pair is stored by value; `F` must accept the vertex stage's
/// working data, which fixes the inter-stage payload for both stages.
#[derive(Debug, Clone)]
pub struct PipelineDescriptor<V, F> {
    vertex: V,
    fragment: F,
    bindings: Vec<VertexBinding>,
    depth: DepthState,
    cull_mode: CullMode,
    front_face: FrontFace,
    topology: Topology,
    provoking_vertex: ProvokingVertex,
}

impl<V, F> PipelineDescriptor<V, F>
where
    V: VertexStage,
    F: FragmentStage<V::Working>,
{
    pub fn builder(vertex: V, fragment: F) -> PipelineBuilder<V, F> {
        PipelineBuilder::new(vertex, fragment)
    }

    #[inline]
    pub fn vertex_stage(&self) -> &V {
        &self.vertex
    }

    #[inline]
    pub fn fragment_stage(&self) -> &F {
        &self.fragment
    }

    #[inline]
    pub fn bindings(&self) -> &[VertexBinding] {
        &self.bindings
    }

    #[inline]
    pub fn depth(&self) -> DepthState {
        self.depth
    }

    #[inline]
    pub fn cull_mode(&self) -> CullMode {
        self.cull_mode
    }

    #[inline]
    pub fn front_face(&self) -> FrontFace {
        self.front_face
    }

    #[inline]
    pub fn topology(&self) -> Topology {
        self.topology
    }

    #[inline]
    pub fn provoking_vertex(&self) -> ProvokingVertex {
        self.provoking_vertex
    }

    /// Size in bytes of the working data passed between the stages.
    #[inline]
    pub fn working_data_size(&self) -> usize {
        size_of::<V::Working>()
    }
}

/// Builder for [`PipelineDescriptor`].
///
/// Defaults: depth test and write on, no culling, counter-clockwise front
/// faces, triangle list, first provoking vertex.
#[derive(Debug, Clone)]
pub struct PipelineBuilder<V, F> {
    vertex: V,
    fragment: F,
    bindings: Vec<VertexBinding>,
    depth: DepthState,
    cull_mode: CullMode,
    front_face: FrontFace,
    topology: Topology,
    provoking_vertex: ProvokingVertex,
}

impl<V, F> PipelineBuilder<V, F>
where
    V: VertexStage,
    F: FragmentStage<V::Working>,
{
    pub fn new(vertex: V, fragment: F) -> Self {
        Self {
            vertex,
            fragment,
            bindings: Vec::new(),
            depth: DepthState::default(),
            cull_mode: CullMode::default(),
            front_face: FrontFace::default(),
            topology: Topology::default(),
            provoking_vertex: ProvokingVertex::default(),
        }
    }

    /// Appends a binding; bindings are numbered in call order.
    pub fn binding(mut self, binding: VertexBinding) -> Self {
        self.bindings.push(binding);
        self
    }

    pub fn depth_test(mut self, enabled: bool) -> Self {
        self.depth.test = enabled;
        self
    }

    pub fn depth_write(mut self, enabled: bool) -> Self {
        self.depth.write = enabled;
        self
    }

    pub fn cull_mode(mut self, mode: CullMode) -> Self {
        self.cull_mode = mode;
        self
    }

    pub fn front_face(mut self, face: FrontFace) -> Self {
        self.front_face = face;
        self
    }

    pub fn topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    pub fn provoking_vertex(mut self, vertex: ProvokingVertex) -> Self {
        self.provoking_vertex = vertex;
        self
    }

    pub fn build(self) -> Result<PipelineDescriptor<V, F>, PipelineError> {
        if self.bindings.is_empty() {
            return Err(PipelineError::NoBindings);
        }
        if self.bindings.len() > MAX_VERTEX_BINDINGS {
            return Err(PipelineError::TooManyBindings {
                count: self.bindings.len(),
                max: MAX_VERTEX_BINDINGS,
            });
        }
        if let Some(binding) = self.bindings.iter().position(|b| b.stride == 0) {
            return Err(PipelineError::ZeroStride { binding });
        }

        let stage = V::INPUT_LAYOUT;
        if stage.len() != self.bindings.len() {
            return Err(PipelineError::StageBindingCountMismatch {
                stage: stage.len(),
                declared: self.bindings.len(),
            });
        }
        if let Some(binding) = stage.iter().zip(&self.bindings).position(|(s, d)| s != d) {
            return Err(PipelineError::StageLayoutMismatch {
                binding,
                stage: stage[binding],
                declared: self.bindings[binding],
            });
        }

        Ok(PipelineDescriptor {
            vertex: self.vertex,
            fragment: self.fragment,
            bindings: self.bindings,
            depth: self.depth,
            cull_mode: self.cull_mode,
            front_face: self.front_face,
            topology: self.topology,
            provoking_vertex: self.provoking_vertex,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::PackedColor;
    use crate::scene::{Instance, Vertex};
    use crate::shader::{FlatColorFragment, InstanceColorVertex};

    fn builder() -> PipelineBuilder<InstanceColorVertex, FlatColorFragment> {
        PipelineDescriptor::builder(InstanceColorVertex, FlatColorFragment)
    }

    // ── build ─────────────────────────────────────────────────────────────

    #[test]
    fn build_requires_a_binding() {
        assert_eq!(builder().build().err(), Some(PipelineError::NoBindings));
    }

    #[test]
    fn build_rejects_zero_stride() {
        let err = builder()
            .binding(VertexBinding::per_vertex::<Vertex>())
            .binding(VertexBinding {
                stride: 0,
                input_rate: InputRate::Instance,
            })
            .build()
            .err();
        assert_eq!(err, Some(PipelineError::ZeroStride { binding: 1 }));
    }

    #[test]
    fn build_caps_binding_count() {
        let mut b = builder();
        for _ in 0..=MAX_VERTEX_BINDINGS {
            b = b.binding(VertexBinding::per_vertex::<Vertex>());
        }
        assert!(matches!(b.build(), Err(PipelineError::TooManyBindings { .. })));
    }

    #[test]
    fn build_rejects_bindings_the_stage_does_not_read() {
        let err = builder()
            .binding(VertexBinding::per_vertex::<Vertex>())
            .binding(VertexBinding::per_instance::<Vertex>())
            .build()
            .err();
        assert_eq!(
            err,
            Some(PipelineError::StageLayoutMismatch {
                binding: 1,
                stage: VertexBinding::per_instance::<Instance>(),
                declared: VertexBinding::per_instance::<Vertex>(),
            })
        );
    }

    #[test]
    fn build_rejects_swapped_input_rates() {
        let err = builder()
            .binding(VertexBinding::per_instance::<Vertex>())
            .binding(VertexBinding::per_instance::<Instance>())
            .build()
            .err();
        assert!(matches!(err, Some(PipelineError::StageLayoutMismatch { binding: 0, .. })));
    }

    #[test]
    fn build_rejects_missing_stage_binding() {
        let err = builder().binding(VertexBinding::per_vertex::<Vertex>()).build().err();
        assert_eq!(
            err,
            Some(PipelineError::StageBindingCountMismatch { stage: 2, declared: 1 })
        );
    }

    #[test]
    fn descriptor_reports_layout() {
        let p = builder()
            .binding(VertexBinding::per_vertex::<Vertex>())
            .binding(VertexBinding::per_instance::<Instance>())
            .cull_mode(CullMode::Back)
            .build()
            .unwrap();

        assert_eq!(p.bindings()[0].stride, 12);
        assert_eq!(p.bindings()[1].stride, 68);
        assert_eq!(p.bindings()[1].input_rate, InputRate::Instance);
        assert_eq!(p.working_data_size(), size_of::<PackedColor>());
        assert_eq!(p.depth(), DepthState { test: true, write: true });
        assert_eq!(p.cull_mode(), CullMode::Back);
    }

    // ── topology ──────────────────────────────────────────────────────────

    #[test]
    fn list_needs_whole_triangles() {
        assert_eq!(Topology::TriangleList.primitive_count(6), Some(2));
        assert_eq!(Topology::TriangleList.primitive_count(4), None);
    }

    #[test]
    fn strip_alternates_winding() {
        assert_eq!(Topology::TriangleStrip.primitive_count(5), Some(3));
        assert_eq!(Topology::TriangleStrip.primitive_indices(0), [0, 1, 2]);
        assert_eq!(Topology::TriangleStrip.primitive_indices(1), [2, 1, 3]);
    }

    #[test]
    fn provoking_vertex_selects_end() {
        assert_eq!(ProvokingVertex::First.select([1, 2, 3]), 1);
        assert_eq!(ProvokingVertex::Last.select([1, 2, 3]), 3);
    }
}
