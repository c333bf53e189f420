/// Point on the motion plane, in world units.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

impl WorldPoint {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned world rectangle given by its corners.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WorldRect {
    pub min: WorldPoint,
    pub max: WorldPoint,
}

impl WorldRect {
    #[inline]
    pub const fn new(min: WorldPoint, max: WorldPoint) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn from_bounds(left: f64, right: f64, bottom: f64, top: f64) -> Self {
        Self::new(WorldPoint::new(left, bottom), WorldPoint::new(right, top))
    }

    /// Finite and non-inverted. Degenerate (zero-area) rectangles are valid
    /// content: a single straight cut has no height.
    #[inline]
    pub fn is_valid(self) -> bool {
        self.min.is_finite()
            && self.max.is_finite()
            && self.max.x >= self.min.x
            && self.max.y >= self.min.y
    }

    #[inline]
    pub fn width(self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(self) -> f64 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn center(self) -> WorldPoint {
        WorldPoint::new((self.min.x + self.max.x) * 0.5, (self.min.y + self.max.y) * 0.5)
    }

    /// Smallest rectangle containing both.
    pub fn union(self, other: WorldRect) -> Self {
        Self::new(
            WorldPoint::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            WorldPoint::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        )
    }
}

/// World-space rectangle currently mapped onto the full control.
///
/// Always `right > left` and `top > bottom` once accepted by
/// [`Camera::set_bounds`](super::Camera::set_bounds).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewportBounds {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

impl ViewportBounds {
    #[inline]
    pub const fn new(left: f64, right: f64, bottom: f64, top: f64) -> Self {
        Self {
            left,
            right,
            bottom,
            top,
        }
    }

    #[inline]
    pub fn width(self) -> f64 {
        self.right - self.left
    }

    #[inline]
    pub fn height(self) -> f64 {
        self.top - self.bottom
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.left.is_finite() && self.right.is_finite() && self.bottom.is_finite() && self.top.is_finite()
    }

    /// `[left, right, bottom, top]` narrowed for the GPU camera uniform.
    #[inline]
    pub fn to_f32_array(self) -> [f32; 4] {
        [self.left as f32, self.right as f32, self.bottom as f32, self.top as f32]
    }
}

impl Default for ViewportBounds {
    fn default() -> Self {
        Self::new(-100.0, 100.0, -100.0, 100.0)
    }
}
