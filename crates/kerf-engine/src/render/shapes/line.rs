use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};

use crate::paint::Color;
use crate::render::{RenderCtx, RenderTarget};

use super::common::{InstanceBuffer, QuadBuffers, instanced_quad_pipeline, uniform_entry};

/// One world-space line segment.
///
/// `width` is in pixels so lines keep their thickness at every zoom level.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct LineSegment {
    pub p0: [f32; 2],
    pub p1: [f32; 2],
    pub color: [f32; 4],
    pub width: f32,
}

impl LineSegment {
    #[inline]
    pub fn new(p0: [f32; 2], p1: [f32; 2], color: Color, width: f32) -> Self {
        Self {
            p0,
            p1,
            color: color.to_array(),
            width,
        }
    }

    const ATTRS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        1 => Float32x2, // p0
        2 => Float32x2, // p1
        3 => Float32x4, // color
        4 => Float32    // width
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: STRIDE as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

const STRIDE: usize = std::mem::size_of::<LineSegment>();

/// A group of segments drawn in one instanced call.
#[derive(Debug, Copy, Clone)]
pub enum LineBatch<'a> {
    /// Uploaded every frame (grid, pointer).
    Transient(&'a [LineSegment]),

    /// Kept on the GPU across frames under `key`.
    ///
    /// While `revision` is unchanged the segment list is treated as
    /// append-only and only the new tail is uploaded; a new revision
    /// re-uploads everything.
    Resident {
        key: u64,
        revision: u64,
        segments: &'a [LineSegment],
    },
}

impl LineBatch<'_> {
    fn segments(&self) -> &[LineSegment] {
        match self {
            LineBatch::Transient(s) => s,
            LineBatch::Resident { segments, .. } => segments,
        }
    }
}

/// What a resident batch needs uploaded this frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UploadPlan {
    /// GPU copy is current.
    Skip,
    /// Write `segments[from..]` after the already uploaded prefix.
    Append { from: usize },
    /// Write every segment; `realloc` when the buffer must grow first.
    Full { realloc: bool },
}

/// Decides how to bring a resident batch up to date.
///
/// `resident` is `(revision, uploaded, capacity)` of the GPU copy, if any.
pub fn plan_upload(resident: Option<(u64, usize, usize)>, revision: u64, len: usize) -> UploadPlan {
    let Some((old_revision, uploaded, capacity)) = resident else {
        return UploadPlan::Full { realloc: true };
    };

    if len > capacity {
        return UploadPlan::Full { realloc: true };
    }
    if old_revision != revision || len < uploaded {
        return UploadPlan::Full { realloc: false };
    }
    if len == uploaded {
        UploadPlan::Skip
    } else {
        UploadPlan::Append { from: uploaded }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct CameraUniform {
    /// left, right, bottom, top
    bounds: [f32; 4],
    viewport: [f32; 2],
    _pad: [f32; 2],
}

struct ResidentBatch {
    revision: u64,
    uploaded: usize,
    buffer: InstanceBuffer,
    seen: bool,
}

/// Instanced renderer for world-space line segments.
///
/// Each segment is expanded to a pixel-wide quad in the vertex shader after
/// projecting its endpoints through orthographic `bounds`.
#[derive(Default)]
pub struct LineRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,

    bind_group_layout: Option<wgpu::BindGroupLayout>,
    bind_group: Option<wgpu::BindGroup>,
    camera_ubo: Option<wgpu::Buffer>,

    quad: Option<QuadBuffers>,

    stream: Option<InstanceBuffer>,
    resident: HashMap<u64, ResidentBatch>,
}

impl LineRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws `batches` in order over the target.
    ///
    /// `bounds` is `[left, right, bottom, top]` in world units, mapped onto the
    /// whole viewport. Resident batches absent from `batches` are released.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        bounds: [f32; 4],
        batches: &[LineBatch<'_>],
    ) {
        self.ensure_pipeline(ctx);
        self.ensure_bindings(ctx);
        if self.quad.is_none() {
            self.quad = Some(QuadBuffers::new(ctx, "kerf line"));
        }

        // ── uploads ────────────────────────────────────────────────────────
        let mut stream_data: Vec<LineSegment> = Vec::new();
        let mut stream_ranges: Vec<std::ops::Range<u32>> = Vec::with_capacity(batches.len());

        for entry in self.resident.values_mut() {
            entry.seen = false;
        }

        for batch in batches {
            match *batch {
                LineBatch::Transient(segments) => {
                    let start = stream_data.len() as u32;
                    stream_data.extend_from_slice(segments);
                    stream_ranges.push(start..stream_data.len() as u32);
                }
                LineBatch::Resident {
                    key,
                    revision,
                    segments,
                } => {
                    self.sync_resident(ctx, key, revision, segments);
                    stream_ranges.push(0..0);
                }
            }
        }
        self.resident.retain(|_, entry| entry.seen);

        if !stream_data.is_empty() {
            let stream =
                InstanceBuffer::ensure(self.stream.take(), ctx, "kerf line stream", STRIDE, stream_data.len());
            ctx.queue
                .write_buffer(&stream.buffer, 0, bytemuck::cast_slice(&stream_data));
            self.stream = Some(stream);
        }

        if let Some(ubo) = self.camera_ubo.as_ref() {
            let u = CameraUniform {
                bounds,
                viewport: [ctx.viewport.width.max(1.0), ctx.viewport.height.max(1.0)],
                _pad: [0.0; 2],
            };
            ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&u));
        }

        // ── draw ───────────────────────────────────────────────────────────
        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(bind_group) = self.bind_group.as_ref() else { return };
        let Some(quad) = self.quad.as_ref() else { return };

        let mut rpass = target.load_pass("kerf line pass");
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, quad.vbo.slice(..));
        rpass.set_index_buffer(quad.ibo.slice(..), wgpu::IndexFormat::Uint16);

        for (batch, range) in batches.iter().zip(stream_ranges) {
            if batch.segments().is_empty() {
                continue;
            }
            match batch {
                LineBatch::Transient(_) => {
                    let Some(stream) = self.stream.as_ref() else { continue };
                    rpass.set_vertex_buffer(1, stream.buffer.slice(..));
                    rpass.draw_indexed(0..6, 0, range);
                }
                LineBatch::Resident { key, .. } => {
                    let Some(entry) = self.resident.get(key) else { continue };
                    rpass.set_vertex_buffer(1, entry.buffer.buffer.slice(..));
                    rpass.draw_indexed(0..6, 0, 0..entry.uploaded as u32);
                }
            }
        }
    }

    fn sync_resident(&mut self, ctx: &RenderCtx<'_>, key: u64, revision: u64, segments: &[LineSegment]) {
        let state = self
            .resident
            .get(&key)
            .map(|r| (r.revision, r.uploaded, r.buffer.capacity));

        match plan_upload(state, revision, segments.len()) {
            UploadPlan::Skip => {}
            UploadPlan::Append { from } => {
                if let Some(entry) = self.resident.get_mut(&key) {
                    ctx.queue.write_buffer(
                        &entry.buffer.buffer,
                        (from * STRIDE) as u64,
                        bytemuck::cast_slice(&segments[from..]),
                    );
                    entry.uploaded = segments.len();
                }
            }
            UploadPlan::Full { realloc } => {
                let current = if realloc {
                    None
                } else {
                    self.resident.remove(&key).map(|r| r.buffer)
                };
                let buffer = InstanceBuffer::ensure(current, ctx, "kerf line resident", STRIDE, segments.len().max(1));
                if !segments.is_empty() {
                    ctx.queue
                        .write_buffer(&buffer.buffer, 0, bytemuck::cast_slice(segments));
                }
                log::trace!("line batch {key:#x} rev {revision}: full upload of {} segments", segments.len());
                self.resident.insert(
                    key,
                    ResidentBatch {
                        revision,
                        uploaded: segments.len(),
                        buffer,
                        seen: true,
                    },
                );
            }
        }

        if let Some(entry) = self.resident.get_mut(&key) {
            entry.seen = true;
        }
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.format) && self.pipeline.is_some() {
            return;
        }

        let bind_group_layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("kerf line bgl"),
                entries: &[uniform_entry::<CameraUniform>(0)],
            });

        let pipeline = instanced_quad_pipeline(
            ctx,
            "kerf line",
            include_str!("shaders/line.wgsl"),
            &bind_group_layout,
            LineSegment::layout(),
        );

        self.pipeline_format = Some(ctx.format);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bind_group_layout);

        self.bind_group = None;
        self.camera_ubo = None;
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group.is_some() && self.camera_ubo.is_some() {
            return;
        }
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };

        let camera_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("kerf line camera ubo"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("kerf line bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_ubo.as_entire_binding(),
            }],
        });

        self.camera_ubo = Some(camera_ubo);
        self.bind_group = Some(bind_group);
    }
}
