//! Coordinate and geometry types shared across engine renderers and the canvas.
//!
//! Canonical pixel space:
//! - Pixels of the offscreen target
//! - Origin top-left
//! - +X right, +Y down
//!
//! World-space geometry (toolpaths, grid) is Y-up and is projected by the line
//! renderer through an orthographic camera uniform instead.

mod rect;
mod vec2;
mod viewport;

pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;
