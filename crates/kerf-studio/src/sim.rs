//! Simulated machine and a toolpath that streams in over time.

use std::f64::consts::TAU;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use kerf_preview::camera::{WorldPoint, WorldRect};
use kerf_preview::collab::{MachineState, MotionSegment, Point3, ToolpathSource};
use parking_lot::{Mutex, RwLock};

/// Append-only toolpath filled by a loader thread.
pub struct StreamingPath {
    segments: RwLock<Vec<MotionSegment>>,
    expected: usize,
    bounds: WorldRect,
}

impl StreamingPath {
    /// Rings of a rosette; each ring is reached by a travel move.
    pub fn rosette(rings: usize, steps: usize) -> (Arc<Self>, Vec<MotionSegment>) {
        let mut all = Vec::with_capacity(rings * (steps + 1));
        let mut pen = WorldPoint::new(0.0, 0.0);

        for ring in 0..rings {
            let radius = 10.0 + 8.0 * ring as f64;
            let lobes = 3.0 + ring as f64;
            let point = |i: usize| {
                let t = TAU * i as f64 / steps as f64;
                let r = radius * (1.0 + 0.15 * (lobes * t).sin());
                WorldPoint::new(r * t.cos(), r * t.sin())
            };

            let start = point(0);
            all.push(MotionSegment::travel(pen, start));
            let power = (ring + 1) as f32 / rings as f32;
            let mut prev = start;
            for i in 1..=steps {
                let next = point(i);
                all.push(MotionSegment::cut(prev, next, power));
                prev = next;
            }
            pen = prev;
        }

        let extent = 10.0 + 8.0 * rings.saturating_sub(1) as f64;
        let bounds = WorldRect::from_bounds(-extent * 1.15, extent * 1.15, -extent * 1.15, extent * 1.15);
        let path = Arc::new(Self {
            segments: RwLock::new(Vec::with_capacity(all.len())),
            expected: all.len(),
            bounds,
        });
        (path, all)
    }

    /// Feeds `segments` in `chunk`-sized pieces from a background thread.
    pub fn stream(self: &Arc<Self>, segments: Vec<MotionSegment>, chunk: usize, pause: Duration) -> thread::JoinHandle<()> {
        let path = Arc::clone(self);
        thread::spawn(move || {
            for piece in segments.chunks(chunk.max(1)) {
                path.segments.write().extend_from_slice(piece);
                thread::sleep(pause);
            }
            log::info!("toolpath loaded: {} segments", path.len());
        })
    }

    /// Marks the first `n` segments executed.
    pub fn mark_executed(&self, n: usize) {
        for seg in self.segments.write().iter_mut().take(n) {
            seg.executed = true;
        }
    }
}

impl ToolpathSource for StreamingPath {
    fn len(&self) -> usize {
        self.segments.read().len()
    }

    fn expected_len(&self) -> usize {
        self.expected
    }

    fn read_segments(&self, start: usize, out: &mut Vec<MotionSegment>) {
        let segments = self.segments.read();
        if let Some(tail) = segments.get(start..) {
            out.extend_from_slice(tail);
        }
    }

    fn bounding_box(&self) -> Option<WorldRect> {
        Some(self.bounds)
    }
}

/// Machine whose head sits wherever it was last jogged.
pub struct SimMachine {
    position: Mutex<Point3>,
    offset: Point3,
    path: Mutex<Option<Arc<dyn ToolpathSource>>>,
    pub show_travel: bool,
    pub show_executed: bool,
}

impl SimMachine {
    pub fn new(offset: Point3) -> Self {
        Self {
            position: Mutex::new(Point3::ZERO),
            offset,
            path: Mutex::new(None),
            show_travel: true,
            show_executed: true,
        }
    }

    pub fn load(&self, path: Arc<dyn ToolpathSource>) {
        *self.path.lock() = Some(path);
    }
}

impl MachineState for SimMachine {
    fn machine_position(&self) -> Point3 {
        let p = *self.position.lock();
        Point3::new(p.x + self.offset.x, p.y + self.offset.y, p.z + self.offset.z)
    }

    fn work_position(&self) -> Point3 {
        *self.position.lock()
    }

    fn working_offset(&self) -> Point3 {
        self.offset
    }

    fn feed(&self) -> f32 {
        1500.0
    }

    fn speed(&self) -> f32 {
        800.0
    }

    fn show_travel(&self) -> bool {
        self.show_travel
    }

    fn show_performance(&self) -> bool {
        true
    }

    fn show_executed(&self) -> bool {
        self.show_executed
    }

    fn toolpath(&self) -> Option<Arc<dyn ToolpathSource>> {
        self.path.lock().clone()
    }

    fn begin_jog(&self, target: WorldPoint, reverse: bool) {
        log::info!("jog to ({:.3}, {:.3}){}", target.x, target.y, if reverse { " reverse" } else { "" });
        let mut p = self.position.lock();
        p.x = target.x;
        p.y = target.y;
    }
}
