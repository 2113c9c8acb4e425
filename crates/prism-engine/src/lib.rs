//! Prism engine crate.
//!
//! Frame-loop render front end over a pluggable rasterizer: shader stage
//! contract, pipeline and draw-call assembly, depth attachment management,
//! orbit camera math, and the window/device pieces that present frames.

pub mod device;
pub mod frame;
pub mod overlay;
pub mod time;
pub mod window;

pub mod framebuffer;
pub mod image;
pub mod logging;
pub mod math;
pub mod pipeline;
pub mod raster;
pub mod scene;
pub mod shader;
