use crate::framebuffer::Framebuffer;
use crate::shader::{FragmentStage, VertexInputs, VertexOutput, VertexStage};

use super::{
    IndexBuffer, InputRate, PipelineDescriptor, PipelineError, VertexBuffer, MAX_VERTEX_BINDINGS,
};

/// Everything a draw reads: pipeline, buffers, uniforms and counts.
pub struct DrawInputs<'a, V: VertexStage, F> {
    pipeline: &'a PipelineDescriptor<V, F>,
    vertex_buffers: Vec<VertexBuffer<'a>>,
    indices: IndexBuffer<'a>,
    uniforms: &'a V::Uniforms,
    index_count: u32,
    instance_count: u32,
}

impl<'a, V, F> DrawInputs<'a, V, F>
where
    V: VertexStage,
    F: FragmentStage<V::Working>,
{
    #[inline]
    pub fn pipeline(&self) -> &'a PipelineDescriptor<V, F> {
        self.pipeline
    }

    #[inline]
    pub fn uniforms(&self) -> &'a V::Uniforms {
        self.uniforms
    }

    #[inline]
    pub fn vertex_buffers(&self) -> &[VertexBuffer<'a>] {
        &self.vertex_buffers
    }

    /// The `index_count` indices this draw consumes.
    #[inline]
    pub fn indices(&self) -> &'a [u32] {
        &self.indices.as_slice()[..self.index_count as usize]
    }

    #[inline]
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    #[inline]
    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }

    /// Primitives per instance.
    pub fn primitive_count(&self) -> u32 {
        self.pipeline
            .topology()
            .primitive_count(self.index_count)
            .unwrap_or(0)
    }

    /// Vertex indices of `primitive`, in winding order.
    pub fn primitive(&self, primitive: u32) -> [u32; 3] {
        let indices = self.indices();
        self.pipeline
            .topology()
            .primitive_indices(primitive)
            .map(|position| indices[position])
    }

    /// Runs the vertex stage for one `(vertex, instance)` pair.
    ///
    /// Per-vertex bindings read record `vertex`, per-instance bindings read
    /// record `instance`. Both must be in range; every index reachable from
    /// the index buffer is, by construction.
    pub fn invoke_vertex(&self, vertex: u32, instance: u32) -> VertexOutput<V::Working> {
        let empty: &[u8] = &[];
        let mut records = [empty; MAX_VERTEX_BINDINGS];

        let bindings = self.pipeline.bindings();
        for ((slot, buffer), binding) in records.iter_mut().zip(&self.vertex_buffers).zip(bindings) {
            let record = match binding.input_rate {
                InputRate::Vertex => vertex,
                InputRate::Instance => instance,
            };
            *slot = buffer.record(record as usize).unwrap_or(&[]);
        }

        let inputs = VertexInputs::new(&records[..bindings.len()]);
        self.pipeline.vertex_stage().invoke(&inputs, self.uniforms)
    }
}

/// One indexed, instanced draw into a framebuffer.
///
/// Only obtainable through [`DrawCallBuilder::build`]; consumed by the
/// rasterizer.
pub struct DrawCall<'a, 'fb, V: VertexStage, F> {
    inputs: DrawInputs<'a, V, F>,
    framebuffer: &'a mut Framebuffer<'fb>,
}

impl<'a, 'fb, V, F> DrawCall<'a, 'fb, V, F>
where
    V: VertexStage,
    F: FragmentStage<V::Working>,
{
    pub fn builder(
        pipeline: &'a PipelineDescriptor<V, F>,
        framebuffer: &'a mut Framebuffer<'fb>,
        uniforms: &'a V::Uniforms,
    ) -> DrawCallBuilder<'a, 'fb, V, F> {
        DrawCallBuilder {
            pipeline,
            framebuffer,
            uniforms,
            vertex_buffers: Vec::with_capacity(pipeline.bindings().len()),
            indices: IndexBuffer::new(&[]),
            index_count: None,
            instance_count: 1,
        }
    }

    #[inline]
    pub fn inputs(&self) -> &DrawInputs<'a, V, F> {
        &self.inputs
    }

    #[inline]
    pub fn framebuffer(&self) -> &Framebuffer<'fb> {
        &*self.framebuffer
    }

    /// Splits the call into its read side and the target it renders into.
    pub fn into_parts(self) -> (DrawInputs<'a, V, F>, &'a mut Framebuffer<'fb>) {
        (self.inputs, self.framebuffer)
    }
}

/// Assembles and validates a [`DrawCall`].
pub struct DrawCallBuilder<'a, 'fb, V: VertexStage, F> {
    pipeline: &'a PipelineDescriptor<V, F>,
    framebuffer: &'a mut Framebuffer<'fb>,
    uniforms: &'a V::Uniforms,
    vertex_buffers: Vec<VertexBuffer<'a>>,
    indices: IndexBuffer<'a>,
    index_count: Option<u32>,
    instance_count: u32,
}

impl<'a, 'fb, V, F> DrawCallBuilder<'a, 'fb, V, F>
where
    V: VertexStage,
    F: FragmentStage<V::Working>,
{
    /// Binds the next buffer; buffers map to pipeline bindings in call order.
    pub fn vertex_buffer(mut self, buffer: VertexBuffer<'a>) -> Self {
        self.vertex_buffers.push(buffer);
        self
    }

    pub fn indices(mut self, indices: IndexBuffer<'a>) -> Self {
        self.indices = indices;
        self
    }

    /// Number of indices to draw. Defaults to the whole index buffer.
    pub fn index_count(mut self, count: u32) -> Self {
        self.index_count = Some(count);
        self
    }

    /// Defaults to 1.
    pub fn instance_count(mut self, count: u32) -> Self {
        self.instance_count = count;
        self
    }

    pub fn build(self) -> Result<DrawCall<'a, 'fb, V, F>, PipelineError> {
        let bindings = self.pipeline.bindings();

        if self.vertex_buffers.len() != bindings.len() {
            return Err(PipelineError::BindingCountMismatch {
                expected: bindings.len(),
                actual: self.vertex_buffers.len(),
            });
        }

        for (binding, (declared, buffer)) in bindings.iter().zip(&self.vertex_buffers).enumerate() {
            if declared.stride != buffer.stride() {
                return Err(PipelineError::StrideMismatch {
                    binding,
                    expected: declared.stride,
                    actual: buffer.stride(),
                });
            }
        }

        let index_count = match self.index_count {
            Some(count) => count,
            None => u32::try_from(self.indices.len()).unwrap_or(u32::MAX),
        };
        if index_count as usize > self.indices.len() {
            return Err(PipelineError::IndexCountOutOfRange {
                count: index_count,
                available: self.indices.len(),
            });
        }

        let topology = self.pipeline.topology();
        if topology.primitive_count(index_count).is_none() {
            return Err(PipelineError::IncompletePrimitive {
                topology,
                count: index_count,
            });
        }

        let used = &self.indices.as_slice()[..index_count as usize];
        let max_index = used
            .iter()
            .enumerate()
            .max_by_key(|&(_, index)| *index);

        for (binding, (declared, buffer)) in bindings.iter().zip(&self.vertex_buffers).enumerate() {
            match declared.input_rate {
                InputRate::Vertex => {
                    if let Some((position, &index)) = max_index {
                        if index as usize >= buffer.len() {
                            return Err(PipelineError::IndexOutOfRange {
                                position,
                                index,
                                vertex_count: buffer.len(),
                            });
                        }
                    }
                }
                InputRate::Instance => {
                    if (self.instance_count as usize) > buffer.len() {
                        return Err(PipelineError::BufferTooShort {
                            binding,
                            rate: InputRate::Instance,
                            available: buffer.len(),
                            required: self.instance_count as usize,
                        });
                    }
                }
            }
        }

        Ok(DrawCall {
            inputs: DrawInputs {
                pipeline: self.pipeline,
                vertex_buffers: self.vertex_buffers,
                indices: self.indices,
                uniforms: self.uniforms,
                index_count,
                instance_count: self.instance_count,
            },
            framebuffer: self.framebuffer,
        })
    }
}
