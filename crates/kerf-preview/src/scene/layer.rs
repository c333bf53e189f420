use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use kerf_engine::paint::{Color, ColorRamp};
use kerf_engine::render::{LineBatch, LineSegment};

use crate::collab::{MotionSegment, ToolpathSource};

use super::palette::ColorScheme;

/// Which moves a layer draws.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// Tool active; colored by laser power.
    Powered,
    /// Positioning moves; fixed color, thin line.
    Travel,
}

impl LayerKind {
    /// Draw order: travel underneath powered.
    pub const DRAW_ORDER: [LayerKind; 2] = [LayerKind::Travel, LayerKind::Powered];

    #[inline]
    pub fn accepts(self, seg: &MotionSegment) -> bool {
        match self {
            LayerKind::Powered => seg.powered,
            LayerKind::Travel => !seg.powered,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            LayerKind::Powered => "powered",
            LayerKind::Travel => "travel",
        }
    }
}

/// Identity of one layer construction; a reload always yields new ids.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub(crate) u64);

impl LayerId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        LayerId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Colors and widths the layers bake into their vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerStyle {
    pub power_ramp: ColorRamp,
    pub travel: Color,
    pub executed: Color,
    pub show_executed: bool,
    pub powered_width: f32,
    pub travel_width: f32,
}

impl LayerStyle {
    pub fn new(colors: &ColorScheme, powered_width: f32, travel_width: f32, show_executed: bool) -> Self {
        Self {
            power_ramp: colors.power_ramp(),
            travel: colors.travel,
            executed: colors.executed,
            show_executed,
            powered_width,
            travel_width,
        }
    }

    fn color(&self, kind: LayerKind, seg: &MotionSegment) -> Color {
        if self.show_executed && seg.executed {
            return self.executed;
        }
        match kind {
            LayerKind::Powered => self.power_ramp.sample(seg.power),
            LayerKind::Travel => self.travel,
        }
    }

    fn width(&self, kind: LayerKind) -> f32 {
        match kind {
            LayerKind::Powered => self.powered_width,
            LayerKind::Travel => self.travel_width,
        }
    }
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self::new(&ColorScheme::default(), 1.0, 1.0, false)
    }
}

/// Renderable form of part of the toolpath.
pub trait Renderable {
    fn id(&self) -> LayerId;
    fn kind(&self) -> LayerKind;

    /// Bumped whenever cached vertices are rebuilt rather than appended to.
    fn revision(&self) -> u64;

    /// Appends whatever the source produced since the last call.
    fn invalidate(&mut self);

    /// Re-colors and rebuilds every cached vertex.
    fn invalidate_all(&mut self, style: &LayerStyle);

    fn segments(&self) -> &[LineSegment];

    /// Share of the expected toolpath consumed so far, in percent.
    fn loading_percentage(&self) -> f64;

    fn vertex_count(&self) -> usize {
        self.segments().len() * 2
    }

    /// GPU-resident batch for this layer.
    fn batch(&self) -> LineBatch<'_> {
        LineBatch::Resident {
            key: self.id().get(),
            revision: self.revision(),
            segments: self.segments(),
        }
    }
}

/// Line layer fed incrementally from a toolpath source.
pub struct PathLayer {
    id: LayerId,
    kind: LayerKind,
    revision: u64,
    source: Arc<dyn ToolpathSource>,
    style: LayerStyle,
    consumed: usize,
    segments: Vec<LineSegment>,
    scratch: Vec<MotionSegment>,
}

impl PathLayer {
    /// Empty layer; the first `invalidate` pulls what the source has.
    pub fn new(kind: LayerKind, source: Arc<dyn ToolpathSource>, style: LayerStyle) -> Self {
        Self {
            id: LayerId::next(),
            kind,
            revision: 0,
            source,
            style,
            consumed: 0,
            segments: Vec::new(),
            scratch: Vec::new(),
        }
    }

    /// Source segments read so far, including those of the other kind.
    #[inline]
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    fn pull(&mut self) {
        self.scratch.clear();
        self.source.read_segments(self.consumed, &mut self.scratch);
        self.consumed += self.scratch.len();

        let kind = self.kind;
        let width = self.style.width(kind);
        for seg in self.scratch.iter().filter(|s| kind.accepts(s)) {
            let color = self.style.color(kind, seg);
            self.segments.push(LineSegment::new(
                [seg.from.x as f32, seg.from.y as f32],
                [seg.to.x as f32, seg.to.y as f32],
                color,
                width,
            ));
        }
    }
}

impl Renderable for PathLayer {
    #[inline]
    fn id(&self) -> LayerId {
        self.id
    }

    #[inline]
    fn kind(&self) -> LayerKind {
        self.kind
    }

    #[inline]
    fn revision(&self) -> u64 {
        self.revision
    }

    fn invalidate(&mut self) {
        self.pull();
    }

    fn invalidate_all(&mut self, style: &LayerStyle) {
        self.style = style.clone();
        self.segments.clear();
        self.consumed = 0;
        self.revision += 1;
        self.pull();
    }

    #[inline]
    fn segments(&self) -> &[LineSegment] {
        &self.segments
    }

    fn loading_percentage(&self) -> f64 {
        let expected = self.source.expected_len();
        if expected == 0 {
            return 100.0;
        }
        (self.consumed as f64 / expected as f64 * 100.0).min(100.0)
    }
}

impl std::fmt::Debug for PathLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathLayer")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("revision", &self.revision)
            .field("consumed", &self.consumed)
            .field("segments", &self.segments.len())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use parking_lot::Mutex;

    use super::*;
    use crate::camera::{WorldPoint, WorldRect};

    /// Toolpath that grows when the test pushes to it.
    #[derive(Default)]
    pub(crate) struct GrowingPath {
        pub segments: Mutex<Vec<MotionSegment>>,
        pub expected: usize,
    }

    impl GrowingPath {
        pub fn push(&self, seg: MotionSegment) {
            self.segments.lock().push(seg);
        }
    }

    impl ToolpathSource for GrowingPath {
        fn len(&self) -> usize {
            self.segments.lock().len()
        }

        fn expected_len(&self) -> usize {
            self.expected
        }

        fn read_segments(&self, start: usize, out: &mut Vec<MotionSegment>) {
            let segs = self.segments.lock();
            if start < segs.len() {
                out.extend_from_slice(&segs[start..]);
            }
        }

        fn bounding_box(&self) -> Option<WorldRect> {
            None
        }
    }

    fn p(x: f64, y: f64) -> WorldPoint {
        WorldPoint::new(x, y)
    }

    #[test]
    fn invalidate_appends_only_matching_kind() {
        let path = Arc::new(GrowingPath {
            expected: 4,
            ..Default::default()
        });
        path.push(MotionSegment::travel(p(0.0, 0.0), p(1.0, 0.0)));
        path.push(MotionSegment::cut(p(1.0, 0.0), p(2.0, 0.0), 0.5));

        let mut powered = PathLayer::new(LayerKind::Powered, path.clone(), LayerStyle::default());
        powered.invalidate();
        assert_eq!(powered.segments().len(), 1);
        assert_eq!(powered.vertex_count(), 2);
        assert_eq!(powered.loading_percentage(), 50.0);

        path.push(MotionSegment::cut(p(2.0, 0.0), p(3.0, 0.0), 1.0));
        let rev = powered.revision();
        powered.invalidate();
        assert_eq!(powered.segments().len(), 2);
        assert_eq!(powered.revision(), rev);
        assert_eq!(powered.consumed(), 3);
    }

    #[test]
    fn invalidate_all_recolors_and_bumps_revision() {
        let path = Arc::new(GrowingPath::default());
        let mut seg = MotionSegment::cut(p(0.0, 0.0), p(1.0, 1.0), 1.0);
        seg.executed = true;
        path.push(seg);

        let mut layer = PathLayer::new(LayerKind::Powered, path, LayerStyle::default());
        layer.invalidate();
        let colors = ColorScheme::default();
        assert_eq!(layer.segments()[0].color, colors.power_ramp().sample(1.0).to_array());

        let style = LayerStyle::new(&colors, 2.0, 1.0, true);
        layer.invalidate_all(&style);
        assert_eq!(layer.revision(), 1);
        assert_eq!(layer.segments().len(), 1);
        assert_eq!(layer.segments()[0].color, colors.executed.to_array());
        assert_eq!(layer.segments()[0].width, 2.0);
    }

    #[test]
    fn nothing_expected_is_fully_loaded() {
        let layer = PathLayer::new(LayerKind::Travel, Arc::new(GrowingPath::default()), LayerStyle::default());
        assert_eq!(layer.loading_percentage(), 100.0);
    }

    #[test]
    fn fresh_layers_get_fresh_ids() {
        let path: Arc<dyn ToolpathSource> = Arc::new(GrowingPath::default());
        let a = PathLayer::new(LayerKind::Powered, path.clone(), LayerStyle::default());
        let b = PathLayer::new(LayerKind::Powered, path, LayerStyle::default());
        assert_ne!(a.id(), b.id());
    }
}
