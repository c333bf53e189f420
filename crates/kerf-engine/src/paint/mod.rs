//! Paint model shared between the renderers and the canvas.
//!
//! Scope:
//! - color representation (linear premultiplied alpha)
//! - color ramps for intensity-driven coloring
//!
//! Geometry types remain in `coords`.

pub mod color;
pub mod ramp;

pub use color::Color;
pub use ramp::{ColorRamp, ColorStop};
