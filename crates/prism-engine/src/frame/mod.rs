//! Frame loop orchestration and engine configuration.

mod config;
mod frame_loop;

pub use config::EngineConfig;
pub use frame_loop::{instanced_pipeline, FrameLoop, FrameReport, InstancedPipeline};
