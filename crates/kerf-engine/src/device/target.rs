use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};

const BYTES_PER_PIXEL: u32 = 4;

type MapResult = Result<(), wgpu::BufferAsyncError>;

/// A staging-buffer map that outlived the read that requested it.
///
/// While parked, the buffer is still being mapped and must not be the
/// destination of another copy.
#[derive(Debug)]
struct PendingMap<T> {
    rx: Option<mpsc::Receiver<T>>,
}

#[derive(Debug, PartialEq)]
enum MapCheck<T> {
    /// No map outstanding.
    Free,
    /// The parked map has not completed yet.
    Busy,
    /// The parked map completed with this result; the slot is free again.
    Settled(T),
}

impl<T> PendingMap<T> {
    const fn new() -> Self {
        Self { rx: None }
    }

    fn park(&mut self, rx: mpsc::Receiver<T>) {
        self.rx = Some(rx);
    }

    fn check(&mut self) -> MapCheck<T> {
        let Some(rx) = &self.rx else {
            return MapCheck::Free;
        };
        match rx.try_recv() {
            Ok(res) => {
                self.rx = None;
                MapCheck::Settled(res)
            }
            Err(mpsc::TryRecvError::Empty) => MapCheck::Busy,
            Err(mpsc::TryRecvError::Disconnected) => {
                self.rx = None;
                MapCheck::Free
            }
        }
    }
}

/// Offscreen color target plus the staging buffer used to read it back.
///
/// Readback rows are padded to `COPY_BYTES_PER_ROW_ALIGNMENT` on the GPU side
/// and de-padded into a tightly packed RGBA buffer on the CPU side.
pub struct OffscreenTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    staging: wgpu::Buffer,
    width: u32,
    height: u32,
    padded_bytes_per_row: u32,
    pending: PendingMap<MapResult>,
}

impl OffscreenTarget {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("kerf offscreen target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let padded_bytes_per_row = padded_row_bytes(width);
        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("kerf readback staging"),
            size: padded_bytes_per_row as u64 * height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        Self {
            texture,
            view,
            staging,
            width,
            height,
            padded_bytes_per_row,
            pending: PendingMap::new(),
        }
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Recreates the target when the requested size differs. Returns `true` on reallocation.
    pub fn ensure_size(
        &mut self,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> bool {
        if (width.max(1), height.max(1)) == (self.width, self.height) {
            return false;
        }
        *self = Self::new(device, format, width, height);
        true
    }

    /// Copies the target into the staging buffer and reads it back into `out`.
    ///
    /// `out` is resized to `width * height * 4` bytes. The call blocks the
    /// owning thread until the map completes or `timeout` elapses.
    ///
    /// A map that times out stays pending on the staging buffer. Later reads
    /// fail without touching the buffer until that map settles, then unmap
    /// it and read normally.
    pub fn read_into(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        timeout: Duration,
        out: &mut Vec<u8>,
    ) -> Result<()> {
        device
            .poll(wgpu::PollType::Poll)
            .map_err(|e| anyhow!("device poll failed: {e}"))?;
        match self.pending.check() {
            MapCheck::Busy => anyhow::bail!("previous readback still pending"),
            // Stale contents from the timed-out read.
            MapCheck::Settled(Ok(())) => self.staging.unmap(),
            MapCheck::Settled(Err(_)) | MapCheck::Free => {}
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("kerf readback encoder"),
        });

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(self.padded_bytes_per_row),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        queue.submit(std::iter::once(encoder.finish()));

        let slice = self.staging.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });

        let deadline = Instant::now() + timeout;
        loop {
            device
                .poll(wgpu::PollType::Poll)
                .map_err(|e| anyhow!("device poll failed: {e}"))?;

            match rx.try_recv() {
                Ok(res) => {
                    res.context("failed to map readback buffer")?;
                    break;
                }
                Err(mpsc::TryRecvError::Empty) => {
                    if Instant::now() >= deadline {
                        self.pending.park(rx);
                        anyhow::bail!("readback timed out after {timeout:?}");
                    }
                    std::thread::sleep(Duration::from_micros(200));
                }
                Err(mpsc::TryRecvError::Disconnected) => {
                    anyhow::bail!("readback callback dropped without result");
                }
            }
        }

        {
            let data = slice.get_mapped_range();
            unpad_rows(&data, self.padded_bytes_per_row, self.width, self.height, out);
        }
        self.staging.unmap();

        Ok(())
    }
}

/// Row pitch for texture-to-buffer copies.
pub fn padded_row_bytes(width: u32) -> u32 {
    let unpadded = width * BYTES_PER_PIXEL;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Strips per-row padding from `src` into a tightly packed `dst`.
pub fn unpad_rows(src: &[u8], padded_bytes_per_row: u32, width: u32, height: u32, dst: &mut Vec<u8>) {
    let row = (width * BYTES_PER_PIXEL) as usize;
    let stride = padded_bytes_per_row as usize;
    dst.resize(row * height as usize, 0);

    for y in 0..height as usize {
        let s = y * stride;
        let d = y * row;
        dst[d..d + row].copy_from_slice(&src[s..s + row]);
    }
}
