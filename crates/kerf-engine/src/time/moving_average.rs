use std::collections::VecDeque;

/// Fixed-window arithmetic mean over the most recent samples.
///
/// Once `window` samples are held, each new sample evicts the oldest.
/// The running sum is kept incrementally and re-derived on eviction
/// boundaries to keep floating-point drift bounded.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    window: usize,
    samples: VecDeque<f64>,
    sum: f64,
    since_resum: usize,
}

impl MovingAverage {
    /// Window size used for render-time and paint-interval statistics.
    pub const DEFAULT_WINDOW: usize = 30;

    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            samples: VecDeque::with_capacity(window),
            sum: 0.0,
            since_resum: 0,
        }
    }

    /// Adds a sample. Non-finite samples are ignored.
    pub fn push(&mut self, sample: f64) {
        if !sample.is_finite() {
            return;
        }
        if self.samples.len() == self.window {
            if let Some(old) = self.samples.pop_front() {
                self.sum -= old;
            }
        }
        self.samples.push_back(sample);
        self.sum += sample;

        self.since_resum += 1;
        if self.since_resum >= self.window {
            self.sum = self.samples.iter().sum();
            self.since_resum = 0;
        }
    }

    /// Mean of the held samples; 0 when empty.
    pub fn average(&self) -> f64 {
        if self.samples.is_empty() {
            0.0
        } else {
            self.sum / self.samples.len() as f64
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.sum = 0.0;
        self.since_resum = 0;
    }
}

impl Default for MovingAverage {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WINDOW)
    }
}
