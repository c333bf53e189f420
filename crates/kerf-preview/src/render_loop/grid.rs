use kerf_engine::paint::Color;
use kerf_engine::render::LineSegment;

use crate::camera::ViewportBounds;
use crate::scene::ColorScheme;

/// Major spacing is coarsened by ×10 until at most this many lines per axis are visible.
pub const MAX_GRID_LINES: f64 = 500.0;

/// Minor (1 unit) lines are drawn only below this visible world width.
pub const MINOR_GRID_MAX_WIDTH: f64 = 100.0;

const MAJOR_BASE: f64 = 10.0;
const LINE_WIDTH: f32 = 1.0;

/// Fills `out` with minor lines, major lines and origin axes, in that order.
pub fn build_grid(bounds: ViewportBounds, colors: &ColorScheme, out: &mut Vec<LineSegment>) {
    out.clear();
    if !bounds.is_finite() || bounds.width() <= 0.0 || bounds.height() <= 0.0 {
        return;
    }

    if bounds.width() < MINOR_GRID_MAX_WIDTH {
        push_lines(bounds, 1.0, colors.grid_minor, out);
    }

    let extent = bounds.width().max(bounds.height());
    let mut major = MAJOR_BASE;
    while extent / major > MAX_GRID_LINES {
        major *= 10.0;
    }
    push_lines(bounds, major, colors.grid_major, out);

    let (l, r, b, t) = (
        bounds.left as f32,
        bounds.right as f32,
        bounds.bottom as f32,
        bounds.top as f32,
    );
    if bounds.bottom <= 0.0 && bounds.top >= 0.0 {
        out.push(LineSegment::new([l, 0.0], [r, 0.0], colors.origin, LINE_WIDTH));
    }
    if bounds.left <= 0.0 && bounds.right >= 0.0 {
        out.push(LineSegment::new([0.0, b], [0.0, t], colors.origin, LINE_WIDTH));
    }
}

/// Vertical and horizontal lines at multiples of `step`, skipping an axis
/// that would need more than [`MAX_GRID_LINES`].
fn push_lines(bounds: ViewportBounds, step: f64, color: Color, out: &mut Vec<LineSegment>) {
    let (l, r, b, t) = (
        bounds.left as f32,
        bounds.right as f32,
        bounds.bottom as f32,
        bounds.top as f32,
    );

    if bounds.width() / step <= MAX_GRID_LINES {
        for x in multiples(bounds.left, bounds.right, step) {
            let x = x as f32;
            out.push(LineSegment::new([x, b], [x, t], color, LINE_WIDTH));
        }
    }
    if bounds.height() / step <= MAX_GRID_LINES {
        for y in multiples(bounds.bottom, bounds.top, step) {
            let y = y as f32;
            out.push(LineSegment::new([l, y], [r, y], color, LINE_WIDTH));
        }
    }
}

fn multiples(lo: f64, hi: f64, step: f64) -> impl Iterator<Item = f64> {
    let first = (lo / step).ceil() as i64;
    let last = (hi / step).floor() as i64;
    (first..=last).map(move |k| k as f64 * step)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_with(out: &[LineSegment], color: Color) -> usize {
        out.iter().filter(|s| s.color == color.to_array()).count()
    }

    #[test]
    fn minor_lines_only_when_zoomed_in() {
        let colors = ColorScheme::default();
        let mut out = Vec::new();

        build_grid(ViewportBounds::new(-5.0, 45.0, 0.5, 20.5), &colors, &mut out);
        // x: -5..=45 → 51 lines, y: 1..=20 → 20 lines.
        assert_eq!(count_with(&out, colors.grid_minor), 71);

        build_grid(ViewportBounds::new(-5.0, 195.0, 0.5, 20.5), &colors, &mut out);
        assert_eq!(count_with(&out, colors.grid_minor), 0);
    }

    #[test]
    fn major_spacing_is_coarsened() {
        let colors = ColorScheme::default();
        let mut out = Vec::new();
        build_grid(ViewportBounds::new(0.5, 20_000.5, 0.5, 100.5), &colors, &mut out);
        // 20 000 wide needs a 100 unit spacing; 200 vertical lines, 1 horizontal.
        assert_eq!(count_with(&out, colors.grid_major), 201);
    }

    #[test]
    fn origin_axes_only_when_visible() {
        let colors = ColorScheme::default();
        let mut out = Vec::new();
        build_grid(ViewportBounds::new(-10.0, 10.0, 5.0, 25.0), &colors, &mut out);
        let axes: Vec<&LineSegment> = out
            .iter()
            .filter(|s| s.color == colors.origin.to_array())
            .collect();
        assert_eq!(axes.len(), 1);
        assert_eq!(axes[0].p0[0], 0.0);
    }
}
