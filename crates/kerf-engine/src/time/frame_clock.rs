use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous tick, in milliseconds.
    ///
    /// Zero on the first tick, where no previous tick exists.
    pub dt_ms: f64,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic tick counter, starting at 0.
    pub frame_index: u64,
}

impl FrameTime {
    /// True when `dt_ms` measures a real interval between two ticks.
    #[inline]
    pub fn has_interval(&self) -> bool {
        self.frame_index > 0
    }
}

/// Clock producing `FrameTime` snapshots for one loop.
///
/// The render loop and the paint side each own one, so neither shares
/// delta-time state with the other.
///
/// Delta time is clamped to keep a debugger pause or a minimized window from
/// dominating averages built on top of it.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Instant>,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    /// Creates a new clock with default clamps (0 ms – 5 s).
    pub fn new() -> Self {
        Self::with_clamps(Duration::ZERO, Duration::from_secs(5))
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: None,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Forgets the previous tick; the next tick reports no interval.
    pub fn reset(&mut self) {
        self.last = None;
        self.frame_index = 0;
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Like [`tick`](Self::tick) with an explicit timestamp.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = match self.last {
            Some(last) => now.saturating_duration_since(last).clamp(self.dt_min, self.dt_max),
            None => Duration::ZERO,
        };

        self.last = Some(now);

        let ft = FrameTime {
            dt_ms: dt.as_secs_f64() * 1000.0,
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
