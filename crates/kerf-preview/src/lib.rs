//! Kerf toolpath preview.
//!
//! A background render loop draws the toolpath, grid, pointer and rulers into
//! an offscreen raster and publishes it. The presentation side blits the
//! latest published frame and composites a HUD on top, at its own cadence.
//!
//! Entry point: [`PreviewControl`].

pub mod camera;
pub mod collab;
pub mod config;
pub mod control;
pub mod diagnostics;
pub mod error;
pub mod frame;
pub mod hud;
pub mod readout;
pub mod render_loop;
pub mod ruler;
pub mod scene;

mod shared;

pub use camera::{Camera, SharedCamera, ViewportBounds, WorldPoint, WorldRect};
pub use collab::{MachineState, MotionSegment, Point3, PreviewSettings, Settings, ToolpathSource};
pub use config::{Padding, PreviewConfig};
pub use control::{PaintOutcome, PreviewControl};
pub use diagnostics::{BackendDiagnostics, RendererType};
pub use error::{PreviewError, Result};
pub use frame::{Frame, FramePublisher};
pub use render_loop::LoopState;
pub use scene::ColorScheme;
