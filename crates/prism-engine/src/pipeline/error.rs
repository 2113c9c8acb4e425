use thiserror::Error;

use super::{InputRate, Topology, VertexBinding};

/// Structural errors caught while building a pipeline or a draw call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("pipeline declares no vertex bindings")]
    NoBindings,

    #[error("pipeline declares {count} vertex bindings, at most {max} are supported")]
    TooManyBindings { count: usize, max: usize },

    #[error("vertex binding {binding} has a zero stride")]
    ZeroStride { binding: usize },

    #[error("vertex stage reads {stage} bindings, pipeline declares {declared}")]
    StageBindingCountMismatch { stage: usize, declared: usize },

    #[error("binding {binding} is declared as {declared:?}, vertex stage reads {stage:?}")]
    StageLayoutMismatch {
        binding: usize,
        stage: VertexBinding,
        declared: VertexBinding,
    },

    #[error("draw call supplies {actual} vertex buffers, pipeline declares {expected} bindings")]
    BindingCountMismatch { expected: usize, actual: usize },

    #[error("vertex buffer {binding} has stride {actual}, pipeline declares {expected}")]
    StrideMismatch {
        binding: usize,
        expected: usize,
        actual: usize,
    },

    #[error("index count {count} exceeds the {available} indices supplied")]
    IndexCountOutOfRange { count: u32, available: usize },

    #[error("index count {count} does not form whole {topology:?} primitives")]
    IncompletePrimitive { topology: Topology, count: u32 },

    #[error("index {index} at position {position} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        position: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("binding {binding} ({rate:?}) holds {available} records, draw needs {required}")]
    BufferTooShort {
        binding: usize,
        rate: InputRate,
        available: usize,
        required: usize,
    },
}
