//! Time subsystem.
//!
//! Provides stable, testable timing utilities without coupling to a runtime:
//! - one `FrameClock` per loop (render cadence, paint cadence)
//! - `MovingAverage` to smooth the intervals and durations it produces

mod frame_clock;
mod moving_average;

pub use frame_clock::{FrameClock, FrameTime};
pub use moving_average::MovingAverage;
