//! Presentation-time overlay: readout boxes and error panels.
//!
//! Layout is pure ([`layout_hud`]); painting goes to a CPU [`Canvas`]
//! so the presentation side never touches the GPU.
//!
//! [`Canvas`]: kerf_engine::canvas::Canvas

mod compose;
mod format;
mod paint;

pub use compose::{
    BOX_GAP, FixedMeasure, FontMeasure, HUD_TOP, HudBox, HudInput, PerfSnapshot, TEXT_PADDING, TextMeasure,
    error_box, layout_hud,
};
pub use format::{format_coord, format_feed_speed, format_vertex_count};
pub use paint::HudPainter;
