//! Pipeline descriptors and draw calls.
//!
//! Structural agreement between a pipeline and the data bound to it (binding
//! count, per-binding stride, index and instance ranges) is checked when a
//! [`DrawCall`] is built, so a call that reaches the rasterizer is always
//! well formed.

mod buffer;
mod descriptor;
mod draw;
mod error;

pub use buffer::{IndexBuffer, VertexBuffer};
pub use descriptor::{
    CullMode, DepthState, FrontFace, InputRate, PipelineBuilder, PipelineDescriptor, ProvokingVertex,
    Topology, VertexBinding, MAX_VERTEX_BINDINGS,
};
pub use draw::{DrawCall, DrawCallBuilder, DrawInputs};
pub use error::PipelineError;
