//! Adaptive tick planning for the axis rulers.

use crate::camera::Camera;

/// `(world width threshold, step)`, ascending.
pub const RULER_STEPS: [(f64, i64); 10] = [
    (100.0, 5),
    (200.0, 10),
    (600.0, 30),
    (1_000.0, 50),
    (2_000.0, 100),
    (6_000.0, 300),
    (10_000.0, 500),
    (20_000.0, 1_000),
    (60_000.0, 3_000),
    (100_000.0, 5_000),
];

/// Step used when the view is wider than every threshold.
pub const FALLBACK_STEP: i64 = 5_000;

/// Tick spacing for a visible world width.
pub fn ruler_step(world_width: f64) -> i64 {
    RULER_STEPS
        .iter()
        .find(|(threshold, _)| world_width < *threshold)
        .map_or(FALLBACK_STEP, |&(_, step)| step)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Axis {
    /// Labels along the bottom strip.
    X,
    /// Labels along the left strip.
    Y,
}

/// One ruler tick: the world value and where it lands on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub value: i64,
    /// Pixel x for [`Axis::X`], pixel y (top-down) for [`Axis::Y`].
    pub screen: f64,
    pub label: String,
}

/// Lazy sequence of ticks along one axis. Clone to restart.
#[derive(Debug, Clone)]
pub struct Ticks {
    axis: Axis,
    next: i64,
    /// Inclusive.
    last: i64,
    step: i64,
    /// World value at screen 0 (x) or the bottom edge (y).
    origin: f64,
    pixels_per_world: f64,
    height: f64,
}

impl Ticks {
    #[inline]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    #[inline]
    pub fn step(&self) -> i64 {
        self.step
    }

    fn screen(&self, value: i64) -> f64 {
        let offset = (value as f64 - self.origin) * self.pixels_per_world;
        match self.axis {
            Axis::X => offset,
            Axis::Y => self.height - offset,
        }
    }
}

impl Iterator for Ticks {
    type Item = Tick;

    fn next(&mut self) -> Option<Tick> {
        if self.next > self.last {
            return None;
        }
        let value = self.next;
        self.next += self.step;
        Some(Tick {
            value,
            screen: self.screen(value),
            label: value.to_string(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = if self.next > self.last {
            0
        } else {
            ((self.last - self.next) / self.step + 1) as usize
        };
        (n, Some(n))
    }
}

impl ExactSizeIterator for Ticks {}

/// Ticks for both rulers of one frame.
#[derive(Debug, Clone)]
pub struct RulerPlan {
    pub step: i64,
    pub x: Ticks,
    pub y: Ticks,
}

/// Plans the rulers from a camera snapshot. Recomputed every frame.
///
/// A tick is emitted for every multiple of the step strictly inside the view
/// once the padding strips, converted to world units, are taken off.
#[derive(Debug, Default, Copy, Clone)]
pub struct RulerPlanner;

impl RulerPlanner {
    pub fn plan(&self, camera: &Camera) -> RulerPlan {
        let bounds = camera.bounds();
        let pad = camera.padding();
        let (w_ratio, h_ratio) = camera.pixels_per_world();
        let height = f64::from(camera.size().1);
        let step = ruler_step(bounds.width());

        let x_start = bounds.left + f64::from(pad.left) / w_ratio;
        let x_end = bounds.right - f64::from(pad.right) / w_ratio;
        let y_start = bounds.bottom + f64::from(pad.bottom) / h_ratio;
        let y_end = bounds.top - f64::from(pad.top) / h_ratio;

        RulerPlan {
            step,
            x: Ticks {
                axis: Axis::X,
                next: first_multiple_above(x_start, step),
                last: last_multiple_below(x_end, step),
                step,
                origin: bounds.left,
                pixels_per_world: w_ratio,
                height,
            },
            y: Ticks {
                axis: Axis::Y,
                next: first_multiple_above(y_start, step),
                last: last_multiple_below(y_end, step),
                step,
                origin: bounds.bottom,
                pixels_per_world: h_ratio,
                height,
            },
        }
    }
}

/// Smallest multiple of `step` strictly greater than `v`.
#[inline]
fn first_multiple_above(v: f64, step: i64) -> i64 {
    ((v / step as f64).floor() as i64 + 1) * step
}

/// Largest multiple of `step` strictly less than `v`.
#[inline]
fn last_multiple_below(v: f64, step: i64) -> i64 {
    ((v / step as f64).ceil() as i64 - 1) * step
}
