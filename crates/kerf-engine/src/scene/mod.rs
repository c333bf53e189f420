//! Scene (draw stream) types.
//!
//! Responsibilities:
//! - store renderer-agnostic pixel-space draw commands
//! - provide deterministic ordering (z-index + insertion order)

mod cmd;
mod list;
mod order;

pub use cmd::{DrawCmd, RectCmd, TextCmd};
pub use list::{DrawItem, DrawList};
pub use order::{SortKey, ZIndex};
