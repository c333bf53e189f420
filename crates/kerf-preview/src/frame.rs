//! Handoff of the latest rendered raster to the presentation side.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::camera::ViewportBounds;

/// A published raster and the camera bounds it was rendered with.
///
/// Pixels are premultiplied RGBA8, tightly packed, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Publish counter value when these pixels were written.
    pub generation: u64,
    /// Bumped only when the buffer had to be reallocated for a new size.
    pub allocation: u64,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    pub bounds: ViewportBounds,
}

impl Frame {
    #[inline]
    pub fn byte_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * 4
    }
}

/// Single-slot frame buffer shared by the render loop and the painter.
///
/// The lock is held only for a memcpy in either direction. Readers see either
/// the previous or the current frame, never a mix.
#[derive(Debug, Default)]
pub struct FramePublisher {
    slot: Mutex<Option<Frame>>,
    generation: AtomicU64,
    allocations: AtomicU64,
}

impl FramePublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies `pixels` into the shared frame, reallocating only on a size change.
    ///
    /// Returns the new generation. Buffers of the wrong length are dropped
    /// with a warning and the previous frame is kept.
    pub fn publish(&self, width: u32, height: u32, pixels: &[u8], bounds: ViewportBounds) -> Option<u64> {
        if pixels.len() != Frame::byte_len(width, height) {
            log::warn!(
                "dropping frame: {} bytes for {width}x{height}",
                pixels.len()
            );
            return None;
        }

        let mut slot = self.slot.lock();
        let generation = self.generation.load(Ordering::Relaxed) + 1;

        match slot.as_mut() {
            Some(frame) if frame.width == width && frame.height == height => {
                frame.pixels.copy_from_slice(pixels);
                frame.generation = generation;
                frame.bounds = bounds;
            }
            _ => {
                let allocation = self.allocations.fetch_add(1, Ordering::Relaxed) + 1;
                *slot = Some(Frame {
                    generation,
                    allocation,
                    width,
                    height,
                    pixels: pixels.to_vec(),
                    bounds,
                });
            }
        }

        self.generation.store(generation, Ordering::Release);
        Some(generation)
    }

    /// Generation of the latest frame; 0 before the first publish.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Runs `f` on the latest frame under the lock. Keep `f` to a copy.
    pub fn with_latest<R>(&self, f: impl FnOnce(&Frame) -> R) -> Option<R> {
        let slot = self.slot.lock();
        slot.as_ref().map(f)
    }

    /// Owned copy of the latest frame.
    pub fn snapshot(&self) -> Option<Frame> {
        self.with_latest(Frame::clone)
    }

    #[inline]
    pub fn has_frame(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Releases the raster.
    pub fn clear(&self) {
        self.slot.lock().take();
    }
}
