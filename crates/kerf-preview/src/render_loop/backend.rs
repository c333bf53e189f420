use kerf_engine::paint::Color;
use kerf_engine::render::{LineBatch, LineSegment};
use kerf_engine::scene::DrawList;

use crate::camera::ViewportBounds;
use crate::diagnostics::RendererType;
use crate::error::PreviewError;

/// What a backend reports about itself once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendInfo {
    pub renderer_type: RendererType,
    pub adapter: String,
    pub vendor: String,
    pub driver: String,
    pub backend: String,
}

/// Everything one frame draws, in paint order.
pub struct FrameScene<'a> {
    pub size: (u32, u32),
    pub bounds: ViewportBounds,
    pub background: Color,
    pub grid: &'a [LineSegment],
    /// Scene layers, travel underneath powered.
    pub layers: Vec<LineBatch<'a>>,
    pub pointer: &'a [LineSegment],
    /// Ruler strips and labels, in screen pixels.
    pub overlay: &'a mut DrawList,
}

impl FrameScene<'_> {
    /// Line batches in paint order: grid, layers, pointer.
    pub fn line_batches(&self) -> Vec<LineBatch<'_>> {
        let mut batches = Vec::with_capacity(self.layers.len() + 2);
        batches.push(LineBatch::Transient(self.grid));
        batches.extend(self.layers.iter().copied());
        batches.push(LineBatch::Transient(self.pointer));
        batches
    }
}

/// Rasterizer the render loop drives. Lives on the render thread only.
pub trait RasterBackend {
    fn info(&self) -> BackendInfo;

    /// Draws one frame. An error here is a fatal fault.
    fn render(&mut self, scene: &mut FrameScene<'_>) -> anyhow::Result<()>;

    /// Copies the last rendered frame into `out` as tightly packed premultiplied
    /// RGBA8. `Ok(None)` means nothing could be read this cycle.
    fn read_pixels(&mut self, out: &mut Vec<u8>) -> anyhow::Result<Option<(u32, u32)>>;

    /// Non-fatal [`PreviewError::Backend`] errors raised since the last call.
    fn take_call_errors(&mut self) -> Vec<PreviewError>;
}

/// Creates the backend on the render thread.
///
/// Called with [`RendererType::Hardware`] first and [`RendererType::Software`]
/// if that fails.
pub trait BackendFactory: Send + 'static {
    fn create(&mut self, kind: RendererType, size: (u32, u32)) -> anyhow::Result<Box<dyn RasterBackend>>;
}
