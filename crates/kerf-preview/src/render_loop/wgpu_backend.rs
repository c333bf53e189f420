use std::sync::Arc;

use anyhow::Result;
use kerf_engine::coords::Viewport;
use kerf_engine::device::{GpuContext, OffscreenInit, OffscreenTarget};
use kerf_engine::render::{LineRenderer, RectRenderer, RenderCtx, RenderTarget, TextRenderer};
use kerf_engine::text::FontSystem;

use crate::diagnostics::RendererType;
use crate::error::PreviewError;

use super::backend::{BackendFactory, BackendInfo, FrameScene, RasterBackend};

/// Creates [`WgpuBackend`]s on the render thread.
pub struct WgpuFactory {
    init: OffscreenInit,
    fonts: Arc<FontSystem>,
}

impl WgpuFactory {
    pub fn new(init: OffscreenInit, fonts: Arc<FontSystem>) -> Self {
        Self { init, fonts }
    }
}

impl BackendFactory for WgpuFactory {
    fn create(&mut self, kind: RendererType, size: (u32, u32)) -> Result<Box<dyn RasterBackend>> {
        let gpu = GpuContext::new_blocking(&self.init, kind.into())?;
        Ok(Box::new(WgpuBackend::new(gpu, kind, size, Arc::clone(&self.fonts))))
    }
}

/// Offscreen wgpu rasterizer with CPU readback.
///
/// Validation errors raised by wgpu panic through the device's default
/// handler and end the loop as a fault; failed readbacks are reported as
/// call-level errors and skip publishing for that cycle.
pub struct WgpuBackend {
    gpu: GpuContext,
    kind: RendererType,
    target: OffscreenTarget,
    lines: LineRenderer,
    rects: RectRenderer,
    text: TextRenderer,
    fonts: Arc<FontSystem>,
    call_errors: Vec<PreviewError>,
}

impl WgpuBackend {
    pub fn new(gpu: GpuContext, kind: RendererType, size: (u32, u32), fonts: Arc<FontSystem>) -> Self {
        let target = OffscreenTarget::new(gpu.device(), gpu.format(), size.0, size.1);
        Self {
            gpu,
            kind,
            target,
            lines: LineRenderer::new(),
            rects: RectRenderer::new(),
            text: TextRenderer::new(),
            fonts,
            call_errors: Vec::new(),
        }
    }
}

impl RasterBackend for WgpuBackend {
    fn info(&self) -> BackendInfo {
        let info = self.gpu.adapter_info();
        BackendInfo {
            renderer_type: self.kind,
            adapter: info.name,
            vendor: format!("{:#06x}", info.vendor),
            driver: if info.driver_info.is_empty() {
                info.driver
            } else {
                format!("{} {}", info.driver, info.driver_info)
            },
            backend: format!("{:?}", info.backend),
        }
    }

    fn render(&mut self, scene: &mut FrameScene<'_>) -> Result<()> {
        let (w, h) = scene.size;
        if self
            .target
            .ensure_size(self.gpu.device(), self.gpu.format(), w, h)
        {
            log::debug!("offscreen target resized to {w}x{h}");
        }
        let (tw, th) = self.target.size();

        let mut frame = self.gpu.begin_frame(self.target.view());
        {
            let ctx = RenderCtx::new(
                self.gpu.device(),
                self.gpu.queue(),
                self.gpu.format(),
                Viewport::new(tw as f32, th as f32),
            );
            let mut target = RenderTarget::new(&mut frame.encoder, frame.view);
            target.clear(scene.background);

            {
                let batches = scene.line_batches();
                self.lines
                    .render(&ctx, &mut target, scene.bounds.to_f32_array(), &batches);
            }
            self.rects.render(&ctx, &mut target, scene.overlay);
            self.text
                .render(&ctx, &mut target, scene.overlay, &self.fonts);
        }
        self.gpu.submit(frame);
        Ok(())
    }

    fn read_pixels(&mut self, out: &mut Vec<u8>) -> Result<Option<(u32, u32)>> {
        let timeout = self.gpu.readback_timeout();
        match self
            .target
            .read_into(self.gpu.device(), self.gpu.queue(), timeout, out)
        {
            Ok(()) => Ok(Some(self.target.size())),
            Err(err) => {
                self.call_errors
                    .push(PreviewError::Backend(format!("{err:#}")));
                Ok(None)
            }
        }
    }

    fn take_call_errors(&mut self) -> Vec<PreviewError> {
        std::mem::take(&mut self.call_errors)
    }
}
