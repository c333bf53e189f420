//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose any windowing types.
//! Hosts are responsible for translating platform events into `InputEvent`s.

mod frame;
mod state;
mod types;

pub use frame::InputFrame;
pub use state::InputState;
pub use types::{InputEvent, MouseButton, MouseButtonState, MouseWheelDelta};
