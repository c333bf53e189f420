use std::fmt::Write as _;
use std::sync::Arc;

use kerf_engine::coords::{Rect, Vec2};
use kerf_engine::text::{FontId, FontSystem};

use crate::camera::WorldPoint;
use crate::config::Padding;
use crate::readout::LiveReadout;

use super::format::{format_coord, format_feed_speed, format_vertex_count};

/// Top of the first box, in pixels.
pub const HUD_TOP: f32 = 12.0;

/// Vertical gap between stacked boxes.
pub const BOX_GAP: f32 = 5.0;

/// Added to measured text size to get a box size.
pub const TEXT_PADDING: Vec2 = Vec2::new(10.0, 5.0);

/// Text measurement used for HUD layout.
pub trait TextMeasure {
    /// Width and height of `text`, which may span several lines.
    fn measure(&self, text: &str) -> Vec2;
}

/// Measures with a loaded font.
#[derive(Clone)]
pub struct FontMeasure {
    pub fonts: Arc<FontSystem>,
    pub id: FontId,
    pub size: f32,
}

impl TextMeasure for FontMeasure {
    fn measure(&self, text: &str) -> Vec2 {
        self.fonts.measure_text(text, self.id, self.size)
    }
}

/// Fixed-pitch estimate, for when no font is available.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FixedMeasure {
    pub advance: f32,
    pub line_height: f32,
}

impl FixedMeasure {
    /// Typical proportions of a monospace face at `size` px.
    pub fn for_size(size: f32) -> Self {
        Self {
            advance: size * 0.6,
            line_height: size * 1.2,
        }
    }
}

impl TextMeasure for FixedMeasure {
    fn measure(&self, text: &str) -> Vec2 {
        let lines = text.split('\n');
        let (mut widest, mut count) = (0usize, 0usize);
        for line in lines {
            widest = widest.max(line.chars().count());
            count += 1;
        }
        Vec2::new(widest as f32 * self.advance, count as f32 * self.line_height)
    }
}

/// Performance counters shown when the machine asks for them.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct PerfSnapshot {
    pub vertex_count: usize,
    /// Average render duration.
    pub render_ms: f64,
    /// Average time between paints.
    pub paint_interval_ms: f64,
}

impl PerfSnapshot {
    pub fn fps(&self) -> f64 {
        if self.paint_interval_ms > 0.0 {
            1000.0 / self.paint_interval_ms
        } else {
            0.0
        }
    }
}

/// Everything the HUD shows on one paint.
#[derive(Debug, Clone, PartialEq)]
pub struct HudInput {
    pub readout: LiveReadout,
    /// World position under the pointer, while it is over the canvas.
    pub pointer: Option<WorldPoint>,
    /// Z-jog enabled: show the Z column even when every Z is zero.
    pub force_z: bool,
    pub perf: Option<PerfSnapshot>,
    /// Load progress while the scene is still loading.
    pub loading: Option<f64>,
}

/// One laid-out HUD box.
#[derive(Debug, Clone, PartialEq)]
pub struct HudBox {
    /// Background, in pixels.
    pub rect: Rect,
    pub text: String,
    /// Top-left of the text block.
    pub text_origin: Vec2,
}

impl HudBox {
    /// Box for `text` with its text block at `origin`.
    fn at(text: String, origin: Vec2, measure: &dyn TextMeasure) -> Self {
        let size = measure.measure(&text) + TEXT_PADDING;
        Self {
            rect: Rect::new(origin.x - 5.0, origin.y - 5.0, size.x, size.y),
            text,
            text_origin: origin,
        }
    }
}

/// Stacks the HUD boxes top to bottom against the right edge of the drawing area.
pub fn layout_hud(input: &HudInput, measure: &dyn TextMeasure, size: (u32, u32), padding: Padding) -> Vec<HudBox> {
    let right = size.0 as f32 - padding.right as f32;
    let mut boxes = Vec::with_capacity(4);
    let mut top = HUD_TOP;

    let mut push = |text: String| {
        let text_size = measure.measure(&text) + TEXT_PADDING;
        let origin = Vec2::new(right - text_size.x, top);
        let b = HudBox::at(text, origin, measure);
        top = b.text_origin.y + b.rect.size.y + BOX_GAP;
        boxes.push(b);
    };

    push(coordinate_text(input));

    let r = &input.readout;
    if r.feed_speed_seen {
        push(format!(
            "F {}\nS {}",
            format_feed_speed(r.feed),
            format_feed_speed(r.speed)
        ));
    }

    if let Some(perf) = input.perf {
        push(format!(
            "VER   {:>6}\nTIM   {:>6.0} ms\nFPS   {:>6.0}",
            format_vertex_count(perf.vertex_count),
            perf.render_ms,
            perf.fps()
        ));
    }

    if let Some(p) = input.loading {
        push(format!("Loading {p:.1}%"));
    }

    boxes
}

fn coordinate_text(input: &HudInput) -> String {
    let r = &input.readout;
    let use_z = input.force_z || r.has_z();

    let mut text = format!("    {:>10} {:>10}", "X", "Y");
    if use_z {
        let _ = write!(text, " {:>10}", "Z");
    }

    let mut row = |label: &str, x: f64, y: f64, z: Option<f64>| {
        let _ = write!(text, "\n{label} {} {}", format_coord(x), format_coord(y));
        if let Some(z) = z {
            let _ = write!(text, " {}", format_coord(z));
        }
    };

    row("MCO", r.machine.x, r.machine.y, use_z.then_some(r.machine.z));
    if r.has_offset() {
        row("WCO", r.work.x, r.work.y, use_z.then_some(r.work.z));
    }
    if let Some(p) = input.pointer {
        row("PTR", p.x, p.y, None);
    }
    text
}

/// Centred error panel for `message`, wider than its text by 20 px.
pub fn error_box(message: &str, measure: &dyn TextMeasure, size: (u32, u32)) -> HudBox {
    let text_size = measure.measure(message) + TEXT_PADDING;
    let panel = Vec2::new(text_size.x + 20.0, text_size.y);
    let origin = Vec2::new(
        (size.0 as f32 - panel.x) / 2.0,
        (size.1 as f32 - panel.y) / 2.0,
    );
    HudBox {
        rect: Rect::new(origin.x - 5.0, origin.y - 5.0, panel.x, panel.y),
        text: message.to_owned(),
        text_origin: Vec2::new(origin.x + 10.0, origin.y),
    }
}
