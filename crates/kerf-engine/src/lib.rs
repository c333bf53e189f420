//! Kerf engine crate.
//!
//! This crate owns the GPU and raster pieces used by the preview control:
//! an offscreen device, instanced renderers, the draw stream they consume,
//! and a CPU canvas the presentation side composes overlays on.

pub mod device;
pub mod input;
pub mod time;

pub mod canvas;
pub mod coords;
pub mod logging;
pub mod paint;
pub mod render;
pub mod scene;
pub mod text;
