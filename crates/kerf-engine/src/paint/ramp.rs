use super::Color;

/// A single ramp stop.
///
/// `t` is expected in [0, 1]; stops are kept sorted by [`ColorRamp::new`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorStop {
    pub t: f32,
    pub color: Color,
}

impl ColorStop {
    #[inline]
    pub const fn new(t: f32, color: Color) -> Self {
        Self { t, color }
    }
}

/// Piecewise-linear color ramp over a scalar in [0, 1].
///
/// Used to color segments by a normalized intensity (e.g. laser power).
/// Outside the first/last stop the edge color is held.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRamp {
    stops: Vec<ColorStop>,
}

impl ColorRamp {
    /// Builds a ramp; non-finite stops are dropped and the rest sorted by `t`.
    pub fn new(mut stops: Vec<ColorStop>) -> Self {
        stops.retain(|s| s.t.is_finite() && s.color.is_finite());
        stops.sort_by(|a, b| a.t.total_cmp(&b.t));
        Self { stops }
    }

    /// Two-stop ramp from `low` at 0 to `high` at 1.
    pub fn linear(low: Color, high: Color) -> Self {
        Self::new(vec![ColorStop::new(0.0, low), ColorStop::new(1.0, high)])
    }

    /// A ramp that always yields `color`.
    pub fn solid(color: Color) -> Self {
        Self::new(vec![ColorStop::new(0.0, color)])
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Samples the ramp at `t`. An empty ramp yields transparent.
    pub fn sample(&self, t: f32) -> Color {
        let Some(first) = self.stops.first() else {
            return Color::transparent();
        };
        if !t.is_finite() || t <= first.t {
            return first.color;
        }

        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.t {
                let span = b.t - a.t;
                if span <= f32::EPSILON {
                    return b.color;
                }
                return a.color.lerp(b.color, (t - a.t) / span);
            }
        }

        // Past the last stop.
        self.stops[self.stops.len() - 1].color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_ramp_interpolates() {
        let ramp = ColorRamp::linear(Color::black(), Color::white());
        assert_eq!(ramp.sample(0.0), Color::black());
        assert_eq!(ramp.sample(1.0), Color::white());
        assert!((ramp.sample(0.25).g - 0.25).abs() < 1e-6);
    }

    #[test]
    fn out_of_range_holds_edges() {
        let ramp = ColorRamp::linear(Color::black(), Color::white());
        assert_eq!(ramp.sample(-3.0), Color::black());
        assert_eq!(ramp.sample(7.0), Color::white());
        assert_eq!(ramp.sample(f32::NAN), Color::black());
    }

    #[test]
    fn stops_are_sorted() {
        let ramp = ColorRamp::new(vec![
            ColorStop::new(1.0, Color::white()),
            ColorStop::new(0.0, Color::black()),
        ]);
        assert_eq!(ramp.stops()[0].t, 0.0);
    }

    #[test]
    fn empty_ramp_is_transparent() {
        assert_eq!(ColorRamp::new(Vec::new()).sample(0.5), Color::transparent());
    }
}
