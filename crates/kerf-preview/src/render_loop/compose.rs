use std::sync::Arc;

use kerf_engine::coords::{Rect, Vec2};
use kerf_engine::paint::Color;
use kerf_engine::render::{LineBatch, LineSegment};
use kerf_engine::scene::{DrawList, ZIndex};
use kerf_engine::text::{FontId, FontSystem};

use crate::camera::Camera;
use crate::collab::Point3;
use crate::ruler::{RulerPlanner, Tick};
use crate::scene::ColorScheme;

use super::backend::FrameScene;
use super::grid::build_grid;

/// Crosshair half-length in world units.
pub const POINTER_REACH: f64 = 2.0;

/// Gap between a Y label and the drawing area.
const LABEL_GAP: f32 = 4.0;

/// Font used for ruler labels.
#[derive(Clone)]
pub struct LabelFont {
    pub fonts: Arc<FontSystem>,
    pub id: FontId,
    pub size: f32,
}

impl LabelFont {
    /// Primary font of `fonts`, if one is loaded.
    pub fn primary(fonts: Arc<FontSystem>, size: f32) -> Option<Self> {
        let id = fonts.primary()?;
        Some(Self { fonts, id, size })
    }

    fn measure(&self, text: &str) -> Vec2 {
        self.fonts.measure_text(text, self.id, self.size)
    }
}

impl std::fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelFont")
            .field("id", &self.id)
            .field("size", &self.size)
            .finish()
    }
}

/// Builds the non-toolpath parts of a frame, reusing its buffers across cycles.
#[derive(Debug)]
pub struct Composer {
    planner: RulerPlanner,
    label_font: Option<LabelFont>,
    pointer_size: f32,
    grid: Vec<LineSegment>,
    pointer: Vec<LineSegment>,
    overlay: DrawList,
}

impl Composer {
    pub fn new(label_font: Option<LabelFont>, pointer_size: f32) -> Self {
        Self {
            planner: RulerPlanner,
            label_font,
            pointer_size,
            grid: Vec::new(),
            pointer: Vec::new(),
            overlay: DrawList::new(),
        }
    }

    pub fn compose(&mut self, camera: &Camera, colors: &ColorScheme, work: Point3) {
        build_grid(camera.bounds(), colors, &mut self.grid);
        self.compose_pointer(work, colors.pointer);
        self.overlay.clear();
        self.compose_strips(camera, colors.ruler_panel);
        self.compose_labels(camera, colors.text);
    }

    /// Frame description borrowing this composer's buffers.
    pub fn scene<'a>(&'a mut self, camera: &Camera, background: Color, layers: Vec<LineBatch<'a>>) -> FrameScene<'a> {
        FrameScene {
            size: camera.size(),
            bounds: camera.bounds(),
            background,
            grid: &self.grid,
            layers,
            pointer: &self.pointer,
            overlay: &mut self.overlay,
        }
    }

    #[inline]
    pub fn grid(&self) -> &[LineSegment] {
        &self.grid
    }

    #[inline]
    pub fn pointer(&self) -> &[LineSegment] {
        &self.pointer
    }

    #[inline]
    pub fn overlay(&self) -> &DrawList {
        &self.overlay
    }

    fn compose_pointer(&mut self, work: Point3, color: Color) {
        self.pointer.clear();
        let (x, y) = (work.x, work.y);
        let r = POINTER_REACH;
        let seg = |a: (f64, f64), b: (f64, f64)| {
            LineSegment::new([a.0 as f32, a.1 as f32], [b.0 as f32, b.1 as f32], color, self.pointer_size)
        };
        let horizontal = seg((x - r, y), (x + r, y));
        let vertical = seg((x, y - r), (x, y + r));
        self.pointer.extend([horizontal, vertical]);
    }

    /// Left, bottom, right, top padding strips.
    fn compose_strips(&mut self, camera: &Camera, color: Color) {
        let (w, h) = camera.size();
        let (w, h) = (w as f32, h as f32);
        let pad = camera.padding();
        let (pl, pt, pr, pb) = (pad.left as f32, pad.top as f32, pad.right as f32, pad.bottom as f32);

        for rect in [
            Rect::new(0.0, 0.0, pl, h),
            Rect::new(0.0, h - pb, w, pb),
            Rect::new(w - pr, 0.0, pr, h),
            Rect::new(0.0, 0.0, w, pt),
        ] {
            self.overlay.push_rect(ZIndex::PANEL, rect, color);
        }
    }

    /// X labels centred in the bottom strip, Y labels right-aligned in the left one.
    fn compose_labels(&mut self, camera: &Camera, color: Color) {
        let Some(font) = self.label_font.as_ref() else { return };
        let plan = self.planner.plan(camera);
        let h = camera.size().1 as f32;
        let pad = camera.padding();

        let place_x = |tick: &Tick| {
            let size = font.measure(&tick.label);
            let strip_top = h - pad.bottom as f32;
            Vec2::new(
                tick.screen as f32 - size.x / 2.0,
                strip_top + (pad.bottom as f32 - size.y).max(0.0) / 2.0,
            )
        };
        let place_y = |tick: &Tick| {
            let size = font.measure(&tick.label);
            Vec2::new(
                pad.left as f32 - LABEL_GAP - size.x,
                tick.screen as f32 - size.y / 2.0,
            )
        };

        for tick in plan.x {
            let origin = place_x(&tick).round();
            self.overlay
                .push_text(ZIndex::LABEL, tick.label, font.id, font.size, color, origin);
        }
        for tick in plan.y {
            let origin = place_y(&tick).round();
            self.overlay
                .push_text(ZIndex::LABEL, tick.label, font.id, font.size, color, origin);
        }
    }
}

#[cfg(test)]
mod tests {
    use kerf_engine::scene::DrawCmd;

    use super::*;
    use crate::config::Padding;

    fn camera() -> Camera {
        Camera::new((400, 300), Padding::new(50, 0, 0, 30), 50_000.0)
    }

    #[test]
    fn pointer_is_a_cross_at_work_position() {
        let mut c = Composer::new(None, 3.0);
        c.compose(&camera(), &ColorScheme::default(), Point3::new(10.0, -4.0, 1.0));
        let p = c.pointer();
        assert_eq!(p.len(), 2);
        assert_eq!((p[0].p0, p[0].p1), ([8.0, -4.0], [12.0, -4.0]));
        assert_eq!((p[1].p0, p[1].p1), ([10.0, -6.0], [10.0, -2.0]));
        assert_eq!(p[0].width, 3.0);
    }

    #[test]
    fn empty_strips_are_skipped() {
        let mut c = Composer::new(None, 3.0);
        c.compose(&camera(), &ColorScheme::default(), Point3::ZERO);
        let rects: Vec<Rect> = c
            .overlay()
            .items()
            .iter()
            .filter_map(|item| match &item.cmd {
                DrawCmd::Rect(r) => Some(r.rect),
                DrawCmd::Text(_) => None,
            })
            .collect();
        assert_eq!(rects, vec![Rect::new(0.0, 0.0, 50.0, 300.0), Rect::new(0.0, 270.0, 400.0, 30.0)]);
    }

    #[test]
    fn no_font_means_no_labels() {
        let mut c = Composer::new(None, 3.0);
        c.compose(&camera(), &ColorScheme::default(), Point3::ZERO);
        assert!(
            c.overlay()
                .items()
                .iter()
                .all(|item| matches!(item.cmd, DrawCmd::Rect(_)))
        );
    }

    #[test]
    fn scene_orders_lines_grid_layers_pointer() {
        let mut c = Composer::new(None, 3.0);
        let cam = camera();
        c.compose(&cam, &ColorScheme::default(), Point3::ZERO);
        let grid_len = c.grid().len();
        let scene = c.scene(&cam, Color::black(), Vec::new());
        let batches = scene.line_batches();
        assert_eq!(batches.len(), 2);
        assert!(matches!(batches[0], LineBatch::Transient(g) if g.len() == grid_len));
        assert!(matches!(batches[1], LineBatch::Transient(p) if p.len() == 2));
    }
}
