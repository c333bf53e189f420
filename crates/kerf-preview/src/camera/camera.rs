use crate::config::Padding;

use super::bounds::{ViewportBounds, WorldPoint, WorldRect};

/// Breathing room applied around fitted content.
pub const AUTO_FIT_GROW: f64 = 1.1;

/// Content assumed when there is nothing to fit.
pub const DEFAULT_CONTENT: WorldRect = WorldRect::new(WorldPoint::new(-100.0, -100.0), WorldPoint::new(100.0, 100.0));

/// Wheel delta units per unit of zoom factor.
pub const ZOOM_DIVISOR: f64 = 1000.0;

/// Orthographic camera: world bounds mapped onto the full control.
///
/// Screen coordinates are pixels with the origin at the top-left corner and y
/// pointing down; world y points up.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    bounds: ViewportBounds,
    width: u32,
    height: u32,
    padding: Padding,
    max_extent: f64,
}

impl Camera {
    /// Starts fitted to [`DEFAULT_CONTENT`].
    pub fn new(size: (u32, u32), padding: Padding, max_extent: f64) -> Self {
        let mut camera = Self {
            bounds: ViewportBounds::default(),
            width: size.0.max(1),
            height: size.1.max(1),
            padding,
            max_extent: max_extent.abs(),
        };
        camera.auto_fit(None);
        camera
    }

    #[inline]
    pub fn bounds(&self) -> ViewportBounds {
        self.bounds
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn padding(&self) -> Padding {
        self.padding
    }

    #[inline]
    pub fn max_extent(&self) -> f64 {
        self.max_extent
    }

    /// World units per pixel, horizontally and vertically.
    #[inline]
    pub fn world_per_pixel(&self) -> (f64, f64) {
        (
            self.bounds.width() / f64::from(self.width),
            self.bounds.height() / f64::from(self.height),
        )
    }

    /// Pixels per world unit, horizontally and vertically.
    #[inline]
    pub fn pixels_per_world(&self) -> (f64, f64) {
        (
            f64::from(self.width) / self.bounds.width(),
            f64::from(self.height) / self.bounds.height(),
        )
    }

    /// Applies new bounds, shifting them back inside `±max_extent`.
    ///
    /// Returns `false` and leaves the camera untouched when the rectangle is
    /// non-finite, empty or inverted, or wider or taller than twice the
    /// maximum extent.
    pub fn set_bounds(&mut self, bounds: ViewportBounds) -> bool {
        if !bounds.is_finite() {
            return false;
        }

        let width = bounds.width();
        let height = bounds.height();
        let limit = 2.0 * self.max_extent;
        if width <= 0.0 || height <= 0.0 || width > limit || height > limit {
            return false;
        }

        let max = self.max_extent;
        let (left, right) = if bounds.left < -max {
            (-max, -max + width)
        } else if bounds.right > max {
            (max - width, max)
        } else {
            (bounds.left, bounds.right)
        };
        let (bottom, top) = if bounds.bottom < -max {
            (-max, -max + height)
        } else if bounds.top > max {
            (max - height, max)
        } else {
            (bounds.bottom, bounds.top)
        };

        // Shifting a sliver against the wall can collapse it.
        if right <= left || top <= bottom {
            return false;
        }

        self.bounds = ViewportBounds::new(left, right, bottom, top);
        true
    }

    pub fn world_to_screen(&self, p: WorldPoint) -> (f64, f64) {
        let b = self.bounds;
        (
            (p.x - b.left) / b.width() * f64::from(self.width),
            (b.top - p.y) / b.height() * f64::from(self.height),
        )
    }

    pub fn screen_to_world(&self, px: f64, py: f64) -> WorldPoint {
        let b = self.bounds;
        WorldPoint::new(
            b.left + px / f64::from(self.width) * b.width(),
            b.top - py / f64::from(self.height) * b.height(),
        )
    }

    /// Moves the view so the content follows a pointer drag of `(dx, dy)` pixels.
    pub fn pan(&mut self, dx: f64, dy: f64) -> bool {
        let (kx, ky) = self.world_per_pixel();
        let (wx, wy) = (dx * kx, dy * ky);
        let b = self.bounds;
        self.set_bounds(ViewportBounds::new(b.left - wx, b.right - wx, b.bottom + wy, b.top + wy))
    }

    /// Moves each edge toward `pivot` by `factor` of its distance to it.
    ///
    /// Positive factors zoom in, negative zoom out. `pivot` keeps its screen
    /// position. A factor of 1 would collapse the view and is rejected.
    pub fn zoom(&mut self, pivot: WorldPoint, factor: f64) -> bool {
        let b = self.bounds;
        self.set_bounds(ViewportBounds::new(
            b.left + factor * (pivot.x - b.left),
            b.right - factor * (b.right - pivot.x),
            b.bottom + factor * (pivot.y - b.bottom),
            b.top - factor * (b.top - pivot.y),
        ))
    }

    /// Zoom factor for a wheel delta in notch units (120 per notch).
    #[inline]
    pub fn zoom_factor(wheel_delta: f64) -> f64 {
        wheel_delta / ZOOM_DIVISOR
    }

    /// Rescales the bounds about the world origin after the control changed size.
    ///
    /// Each axis scales by its size ratio divided by the larger of the two
    /// ratios, so one axis keeps its extent and the other can only shrink.
    /// Zero sizes are ignored.
    pub fn on_resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        if (width, height) == (self.width, self.height) {
            return true;
        }

        let mut w_ratio = f64::from(width) / f64::from(self.width);
        let mut h_ratio = f64::from(height) / f64::from(self.height);
        let norm = w_ratio.abs().max(h_ratio.abs());
        w_ratio /= norm;
        h_ratio /= norm;

        self.width = width;
        self.height = height;

        let b = self.bounds;
        self.set_bounds(ViewportBounds::new(
            b.left * w_ratio,
            b.right * w_ratio,
            b.bottom * h_ratio,
            b.top * h_ratio,
        ));
        true
    }

    /// Frames `content` with [`AUTO_FIT_GROW`] breathing room inside the padded area.
    ///
    /// The axis whose aspect is tighter against the available area is fit
    /// exactly; the other follows the control's aspect ratio. The result is
    /// then shifted so the content centre sits at the centre of the area left
    /// free by the padding. Invalid or absent content fits [`DEFAULT_CONTENT`].
    pub fn auto_fit(&mut self, content: Option<WorldRect>) -> bool {
        let content = content.filter(|r| r.is_valid()).unwrap_or(DEFAULT_CONTENT);
        let (extent_w, extent_h) = match (content.width() > 0.0, content.height() > 0.0) {
            (true, true) => (content.width(), content.height()),
            (true, false) => (content.width(), content.width()),
            (false, true) => (content.height(), content.height()),
            (false, false) => (DEFAULT_CONTENT.width(), DEFAULT_CONTENT.height()),
        };

        let w = f64::from(self.width);
        let h = f64::from(self.height);
        let pad = self.padding;
        let ratio = w / h;
        let avail_w = (w - f64::from(pad.horizontal())).max(1.0);
        let avail_h = (h - f64::from(pad.vertical())).max(1.0);

        let drawing_w = extent_w * AUTO_FIT_GROW;
        let drawing_h = extent_h * AUTO_FIT_GROW;
        let center = content.center();

        let bounds = if drawing_w / drawing_h > avail_w / avail_h {
            let scale = drawing_w / avail_w;
            let left = center.x - drawing_w / 2.0 - f64::from(pad.left) * scale;
            let right = center.x + drawing_w / 2.0 + f64::from(pad.right) * scale;

            let resized_h = (right - left) / ratio;
            let shift = resized_h / h * (f64::from(pad.bottom) - f64::from(pad.top)) / 2.0;
            let bottom = center.y - resized_h / 2.0 - shift;
            let top = center.y + resized_h / 2.0 - shift;
            ViewportBounds::new(left, right, bottom, top)
        } else {
            let scale = drawing_h / avail_h;
            let bottom = center.y - drawing_h / 2.0 - f64::from(pad.bottom) * scale;
            let top = center.y + drawing_h / 2.0 + f64::from(pad.top) * scale;

            let resized_w = (top - bottom) * ratio;
            let shift = resized_w / w * (f64::from(pad.left) - f64::from(pad.right)) / 2.0;
            let left = center.x - resized_w / 2.0 - shift;
            let right = center.x + resized_w / 2.0 - shift;
            ViewportBounds::new(left, right, bottom, top)
        };

        self.set_bounds(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const MAX: f64 = 50_000.0;

    fn camera(w: u32, h: u32) -> Camera {
        Camera::new((w, h), Padding::default(), MAX)
    }

    fn unpadded(w: u32, h: u32) -> Camera {
        Camera::new((w, h), Padding::new(0, 0, 0, 0), MAX)
    }

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    // ── set_bounds ─────────────────────────────────────────────────────

    #[test]
    fn shifts_back_inside_extent_without_shrinking() {
        let mut cam = camera(800, 600);
        assert!(cam.set_bounds(ViewportBounds::new(-50_500.0, -49_500.0, 49_800.0, 50_200.0)));
        let b = cam.bounds();
        assert_eq!((b.left, b.right), (-50_000.0, -49_000.0));
        assert_eq!((b.bottom, b.top), (49_600.0, 50_000.0));
    }

    #[test]
    fn rejects_too_wide_or_degenerate() {
        let mut cam = camera(800, 600);
        let before = cam.bounds();
        assert!(!cam.set_bounds(ViewportBounds::new(-60_000.0, 60_000.0, 0.0, 10.0)));
        assert!(!cam.set_bounds(ViewportBounds::new(0.0, 10.0, -60_000.0, 60_000.0)));
        assert!(!cam.set_bounds(ViewportBounds::new(5.0, 5.0, 0.0, 10.0)));
        assert!(!cam.set_bounds(ViewportBounds::new(0.0, 10.0, 3.0, -3.0)));
        assert!(!cam.set_bounds(ViewportBounds::new(0.0, f64::INFINITY, 0.0, 1.0)));
        assert_eq!(cam.bounds(), before);
    }

    // ── transforms ─────────────────────────────────────────────────────

    #[test]
    fn corners_map_to_control_corners() {
        let mut cam = unpadded(200, 100);
        assert!(cam.set_bounds(ViewportBounds::new(0.0, 20.0, 0.0, 10.0)));
        assert_eq!(cam.world_to_screen(WorldPoint::new(0.0, 10.0)), (0.0, 0.0));
        assert_eq!(cam.world_to_screen(WorldPoint::new(20.0, 0.0)), (200.0, 100.0));
        assert_eq!(cam.screen_to_world(100.0, 50.0), WorldPoint::new(10.0, 5.0));
    }

    #[test]
    fn pan_follows_pointer() {
        let mut cam = unpadded(200, 100);
        assert!(cam.set_bounds(ViewportBounds::new(0.0, 20.0, 0.0, 10.0)));
        let grabbed = cam.screen_to_world(50.0, 50.0);

        assert!(cam.pan(30.0, -20.0));
        let (sx, sy) = cam.world_to_screen(grabbed);
        assert!(close(sx, 80.0, 1e-9) && close(sy, 30.0, 1e-9));
    }

    // ── zoom ───────────────────────────────────────────────────────────

    #[test]
    fn zoom_zero_and_one_are_noops() {
        let mut cam = camera(800, 600);
        let before = cam.bounds();
        let pivot = WorldPoint::new(3.0, -7.0);
        assert!(cam.zoom(pivot, 0.0));
        assert_eq!(cam.bounds(), before);
        assert!(!cam.zoom(pivot, 1.0));
        assert_eq!(cam.bounds(), before);
    }

    #[test]
    fn wheel_notch_zooms_in_by_twelve_percent() {
        let mut cam = unpadded(100, 100);
        assert!(cam.set_bounds(ViewportBounds::new(-50.0, 50.0, -50.0, 50.0)));
        assert!(cam.zoom(WorldPoint::new(0.0, 0.0), Camera::zoom_factor(120.0)));
        assert!(close(cam.bounds().width(), 88.0, 1e-9));
    }

    // ── resize ─────────────────────────────────────────────────────────

    #[test]
    fn resize_only_shrinks_the_other_axis() {
        let mut cam = unpadded(100, 100);
        assert!(cam.set_bounds(ViewportBounds::new(-10.0, 10.0, -10.0, 10.0)));

        assert!(cam.on_resize(200, 100));
        let b = cam.bounds();
        assert_eq!((b.left, b.right), (-10.0, 10.0));
        assert_eq!((b.bottom, b.top), (-5.0, 5.0));
        assert_eq!(cam.size(), (200, 100));
    }

    #[test]
    fn resize_to_zero_is_ignored() {
        let mut cam = camera(800, 600);
        let before = cam;
        assert!(!cam.on_resize(0, 600));
        assert!(!cam.on_resize(800, 0));
        assert_eq!(cam, before);
    }

    // ── auto fit ───────────────────────────────────────────────────────

    #[test]
    fn default_fit_contains_default_content() {
        let cam = camera(800, 600);
        let b = cam.bounds();
        assert!(b.left < -100.0 && b.right > 100.0);
        assert!(b.bottom < -100.0 && b.top > 100.0);
    }

    #[test]
    fn fit_centres_content_in_padded_area() {
        for size in [(800, 600), (300, 900), (1000, 200)] {
            let mut cam = camera(size.0, size.1);
            let content = WorldRect::from_bounds(10.0, 110.0, -20.0, 30.0);
            assert!(cam.auto_fit(Some(content)));

            let pad = cam.padding();
            let (sx, sy) = cam.world_to_screen(content.center());
            let cx = f64::from(pad.left) + f64::from(size.0 - pad.horizontal()) / 2.0;
            let cy = f64::from(pad.top) + f64::from(size.1 - pad.vertical()) / 2.0;
            assert!(close(sx, cx, 1e-6), "{size:?}: x {sx} vs {cx}");
            assert!(close(sy, cy, 1e-6), "{size:?}: y {sy} vs {cy}");

            let (lo_x, lo_y) = cam.world_to_screen(content.min);
            let (hi_x, hi_y) = cam.world_to_screen(content.max);
            assert!(lo_x >= f64::from(pad.left) - 1e-6);
            assert!(hi_x <= f64::from(size.0 - pad.right) + 1e-6);
            assert!(hi_y >= f64::from(pad.top) - 1e-6);
            assert!(lo_y <= f64::from(size.1 - pad.bottom) + 1e-6);
        }
    }

    #[test]
    fn fit_keeps_square_pixels() {
        let mut cam = camera(640, 480);
        assert!(cam.auto_fit(Some(WorldRect::from_bounds(0.0, 500.0, 0.0, 20.0))));
        let (kx, ky) = cam.world_per_pixel();
        assert!(close(kx, ky, 1e-9));
    }

    #[test]
    fn fit_of_a_single_line_has_area() {
        let mut cam = camera(640, 480);
        assert!(cam.auto_fit(Some(WorldRect::from_bounds(0.0, 40.0, 5.0, 5.0))));
        assert!(cam.bounds().height() > 0.0);
    }

    #[test]
    fn fit_of_oversized_content_is_rejected() {
        let mut cam = camera(640, 480);
        let before = cam.bounds();
        assert!(!cam.auto_fit(Some(WorldRect::from_bounds(-99_000.0, 99_000.0, 0.0, 1.0))));
        assert_eq!(cam.bounds(), before);
    }

    // ── properties ─────────────────────────────────────────────────────

    fn bounds_strategy() -> impl Strategy<Value = ViewportBounds> {
        (-45_000.0..45_000.0f64, 0.01..5_000.0f64, -45_000.0..45_000.0f64, 0.01..5_000.0f64)
            .prop_map(|(l, w, b, h)| ViewportBounds::new(l, l + w, b, b + h))
    }

    proptest! {
        #[test]
        fn screen_world_round_trip(
            bounds in bounds_strategy(),
            w in 1u32..4000,
            h in 1u32..4000,
            tx in 0.0..1.0f64,
            ty in 0.0..1.0f64,
        ) {
            let mut cam = unpadded(w, h);
            prop_assert!(cam.set_bounds(bounds));
            let p = WorldPoint::new(
                bounds.left + tx * bounds.width(),
                bounds.bottom + ty * bounds.height(),
            );
            let (sx, sy) = cam.world_to_screen(p);
            let back = cam.screen_to_world(sx, sy);
            prop_assert!(close(back.x, p.x, 1e-7), "{} vs {}", back.x, p.x);
            prop_assert!(close(back.y, p.y, 1e-7), "{} vs {}", back.y, p.y);
        }

        #[test]
        fn set_bounds_keeps_invariants(
            l in -200_000.0..200_000.0f64,
            r in -200_000.0..200_000.0f64,
            b in -200_000.0..200_000.0f64,
            t in -200_000.0..200_000.0f64,
        ) {
            let mut cam = camera(800, 600);
            cam.set_bounds(ViewportBounds::new(l, r, b, t));
            let out = cam.bounds();
            prop_assert!(out.right > out.left && out.top > out.bottom);
            prop_assert!(out.left >= -MAX && out.right <= MAX);
            prop_assert!(out.bottom >= -MAX && out.top <= MAX);
        }

        #[test]
        fn zoom_keeps_pivot_on_screen(
            bounds in bounds_strategy(),
            tx in 0.0..1.0f64,
            ty in 0.0..1.0f64,
            factor in -0.9..0.9f64,
        ) {
            let mut cam = unpadded(800, 600);
            prop_assert!(cam.set_bounds(bounds));
            let pivot = WorldPoint::new(
                bounds.left + tx * bounds.width(),
                bounds.bottom + ty * bounds.height(),
            );
            let before = cam.world_to_screen(pivot);
            if cam.zoom(pivot, factor) {
                let after = cam.world_to_screen(pivot);
                let shifted = cam.bounds().left != bounds.left + factor * (pivot.x - bounds.left)
                    || cam.bounds().bottom != bounds.bottom + factor * (pivot.y - bounds.bottom);
                // A clamped zoom-out is allowed to move the view.
                if !shifted {
                    prop_assert!(close(before.0, after.0, 1e-4));
                    prop_assert!(close(before.1, after.1, 1e-4));
                }
            }
        }
    }
}
