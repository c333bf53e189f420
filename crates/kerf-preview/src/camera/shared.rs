use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use super::camera::Camera;

/// Camera published between the input side and the render loop.
///
/// Writers mutate a copy-sized value under a short write lock; readers take
/// the whole camera by value so one cycle never sees half an update.
#[derive(Debug)]
pub struct SharedCamera {
    camera: RwLock<Camera>,
    generation: AtomicU64,
}

impl SharedCamera {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera: RwLock::new(camera),
            generation: AtomicU64::new(0),
        }
    }

    /// Consistent copy of the current camera.
    #[inline]
    pub fn snapshot(&self) -> Camera {
        *self.camera.read()
    }

    /// Applies `f` under the write lock; bumps the generation if it changed anything.
    pub fn update<R>(&self, f: impl FnOnce(&mut Camera) -> R) -> R {
        let mut guard = self.camera.write();
        let before = *guard;
        let out = f(&mut guard);
        if *guard != before {
            self.generation.fetch_add(1, Ordering::Release);
        }
        out
    }

    /// Incremented on every effective change.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::camera::ViewportBounds;
    use crate::config::Padding;

    #[test]
    fn generation_counts_effective_changes() {
        let shared = SharedCamera::new(Camera::new((400, 300), Padding::default(), 50_000.0));
        let g0 = shared.generation();

        assert!(!shared.update(|c| c.set_bounds(ViewportBounds::new(1.0, 1.0, 0.0, 1.0))));
        assert_eq!(shared.generation(), g0);

        assert!(shared.update(|c| c.pan(10.0, 0.0)));
        assert_eq!(shared.generation(), g0 + 1);
    }

    #[test]
    fn readers_never_see_torn_bounds() {
        let shared = Arc::new(SharedCamera::new(Camera::new((400, 400), Padding::new(0, 0, 0, 0), 50_000.0)));

        let writer = {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                for i in 0..2_000 {
                    let v = f64::from(i % 100 + 1);
                    shared.update(|c| c.set_bounds(ViewportBounds::new(-v, v, -v, v)));
                }
            })
        };

        for _ in 0..2_000 {
            let b = shared.snapshot().bounds();
            assert_eq!(b.right, -b.left);
            assert_eq!(b.top, -b.bottom);
        }
        writer.join().unwrap();
    }
}
