//! Rasterizer engine contract.
//!
//! [`RasterEngine`] is the raw engine surface: clear attachments, render an
//! indexed draw. [`Rasterizer`] wraps an engine, validates clears before
//! anything is written, and is shared by reference counting between the frame
//! loop and the overlay.

mod engine;
mod error;
mod software;

pub use engine::{EngineOptions, RasterEngine, Rasterizer};
pub use error::RenderError;
pub use software::{RasterStats, SoftwareRasterizer};
