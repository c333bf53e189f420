//! Background render cadence.
//!
//! One dedicated thread owns the rendering backend for the control's
//! lifetime. Each cycle snapshots the camera, applies pending scene requests,
//! draws grid, toolpath, pointer and rulers, and publishes the raster.

mod backend;
mod compose;
mod driver;
mod grid;
mod state;
mod wgpu_backend;

pub use backend::{BackendFactory, BackendInfo, FrameScene, RasterBackend};
pub use compose::{Composer, LabelFont};
pub use driver::{LoopSettings, RenderLoop};
pub use grid::{MAX_GRID_LINES, MINOR_GRID_MAX_WIDTH, build_grid};
pub use state::LoopState;
pub use wgpu_backend::{WgpuBackend, WgpuFactory};

pub(crate) use state::AtomicLoopState;

#[cfg(test)]
pub(crate) use driver::tests::{FakeFactory, Script};
