//! Programmable stage pair.
//!
//! A vertex stage turns the current per-binding records plus uniforms into a
//! clip-space position and a working-data value. A fragment stage turns the
//! working data of a primitive into a color. Both are pure: no state is kept
//! between invocations.
//!
//! Working data is not interpolated. Every fragment of a primitive receives
//! the value written by the primitive's provoking vertex (see
//! [`ProvokingVertex`](crate::pipeline::ProvokingVertex)). The working data
//! type is an associated type of the vertex stage, so both stages agree on
//! its size and layout at compile time.

mod flat_color;
mod stage;

pub use flat_color::{FlatColorFragment, InstanceColorVertex, INSTANCE_BINDING, VERTEX_BINDING};
pub use stage::{FragmentStage, ShaderContext, VertexInputs, VertexOutput, VertexStage};
