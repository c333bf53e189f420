//! Orthographic camera over the motion plane.
//!
//! `Camera` is a plain value: every transform reads one consistent set of
//! bounds. `SharedCamera` publishes it between the presentation side (which
//! mutates it on input) and the render loop (which snapshots it per cycle).

mod bounds;
#[allow(clippy::module_inception)]
mod camera;
mod shared;

pub use bounds::{ViewportBounds, WorldPoint, WorldRect};
pub use camera::{AUTO_FIT_GROW, Camera, DEFAULT_CONTENT, ZOOM_DIVISOR};
pub use shared::SharedCamera;
