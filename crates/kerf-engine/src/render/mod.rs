//! GPU rendering subsystem.
//!
//! Renderers consume line batches or `scene` draw streams and issue GPU
//! commands via wgpu. Each renderer owns its GPU resources (pipelines, buffers).
//!
//! Convention:
//! - `LineRenderer` geometry is in world units (Y up), projected through
//!   orthographic bounds.
//! - Rect/text geometry is in pixels (top-left origin, +Y down).
//! - Vertex shaders convert to NDC using a uniform.

mod ctx;
pub mod shapes;

pub use ctx::{RenderCtx, RenderTarget};
pub use shapes::line::{LineBatch, LineRenderer, LineSegment, UploadPlan, plan_upload};
pub use shapes::rect::RectRenderer;
pub use shapes::text::TextRenderer;
