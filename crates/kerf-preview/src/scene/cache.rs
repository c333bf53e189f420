use std::sync::Arc;

use kerf_engine::render::LineBatch;
use parking_lot::Mutex;

use crate::collab::MachineState;

use super::layer::{LayerId, LayerKind, LayerStyle, PathLayer, Renderable};
use super::mailbox::Requests;

/// Counters readers may need while the render thread owns the layers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneStats {
    /// Completed reloads since the cache was created.
    pub rebuilds: u64,
    pub powered: Option<LayerStats>,
    pub travel: Option<LayerStats>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LayerStats {
    pub id: LayerId,
    pub revision: u64,
    pub vertex_count: usize,
    pub loading_percentage: f64,
}

impl SceneStats {
    /// Vertices of the powered layer, as shown in the HUD.
    pub fn vertex_count(&self) -> usize {
        self.powered.map_or(0, |l| l.vertex_count)
    }

    /// Load progress while any drawn layer is incomplete, `None` once done.
    ///
    /// With travel shown this is the mean of both layers; otherwise the
    /// powered layer alone.
    pub fn loading_percentage(&self, show_travel: bool) -> Option<f64> {
        let powered = self.powered?.loading_percentage;
        let travel = self.travel.filter(|_| show_travel).map(|l| l.loading_percentage);

        match travel {
            Some(travel) if powered < 100.0 || travel < 100.0 => Some((powered + travel) / 2.0),
            Some(_) => None,
            None if powered < 100.0 => Some(powered),
            None => None,
        }
    }
}

/// Owns the scene layers on the render thread.
///
/// Applies mailbox requests once per cycle in a fixed order: reload, full
/// invalidate, then the incremental append every cycle performs.
#[derive(Debug)]
pub struct SceneCache {
    layers: Vec<PathLayer>,
    rebuilds: u64,
    stats: Arc<Mutex<SceneStats>>,
}

impl SceneCache {
    pub fn new(stats: Arc<Mutex<SceneStats>>) -> Self {
        Self {
            layers: Vec::with_capacity(LayerKind::DRAW_ORDER.len()),
            rebuilds: 0,
            stats,
        }
    }

    pub fn apply(&mut self, requests: Requests, machine: &dyn MachineState, style: &LayerStyle) {
        let show_travel = machine.show_travel();

        if requests.reload {
            self.reload(machine, style);
        } else if requests.full_invalidate {
            for layer in &mut self.layers {
                layer.invalidate_all(style);
            }
        }

        for layer in &mut self.layers {
            if layer.kind() == LayerKind::Travel && !show_travel {
                continue;
            }
            layer.invalidate();
        }

        self.publish();
    }

    fn reload(&mut self, machine: &dyn MachineState, style: &LayerStyle) {
        if !self.layers.is_empty() {
            log::debug!("disposing {} scene layers", self.layers.len());
            self.layers.clear();
        }

        self.rebuilds += 1;
        let Some(source) = machine.toolpath() else {
            log::debug!("reload with no toolpath loaded");
            return;
        };

        for kind in LayerKind::DRAW_ORDER {
            self.layers.push(PathLayer::new(kind, Arc::clone(&source), style.clone()));
        }
        log::debug!(
            "rebuilt scene layers ({} of {} segments available)",
            source.len(),
            source.expected_len()
        );
    }

    fn publish(&self) {
        let mut stats = SceneStats {
            rebuilds: self.rebuilds,
            ..SceneStats::default()
        };
        for layer in &self.layers {
            let entry = LayerStats {
                id: layer.id(),
                revision: layer.revision(),
                vertex_count: layer.vertex_count(),
                loading_percentage: layer.loading_percentage(),
            };
            match layer.kind() {
                LayerKind::Powered => stats.powered = Some(entry),
                LayerKind::Travel => stats.travel = Some(entry),
            }
        }
        *self.stats.lock() = stats;
    }

    /// Batches to draw this frame, travel underneath powered.
    pub fn batches(&self, show_travel: bool) -> Vec<LineBatch<'_>> {
        self.layers
            .iter()
            .filter(|l| show_travel || l.kind() != LayerKind::Travel)
            .map(|l| l.batch())
            .collect()
    }

    pub fn layers(&self) -> impl Iterator<Item = &dyn Renderable> {
        self.layers.iter().map(|l| l as &dyn Renderable)
    }

    #[inline]
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::RwLock;

    use super::*;
    use crate::camera::WorldPoint;
    use crate::collab::{MotionSegment, Point3, ToolpathSource};
    use crate::scene::layer::tests::GrowingPath;
    use crate::scene::mailbox::RequestMailbox;

    #[derive(Default)]
    struct Machine {
        path: RwLock<Option<Arc<dyn ToolpathSource>>>,
        show_travel: bool,
    }

    impl MachineState for Machine {
        fn machine_position(&self) -> Point3 {
            Point3::ZERO
        }
        fn work_position(&self) -> Point3 {
            Point3::ZERO
        }
        fn working_offset(&self) -> Point3 {
            Point3::ZERO
        }
        fn feed(&self) -> f32 {
            0.0
        }
        fn speed(&self) -> f32 {
            0.0
        }
        fn show_travel(&self) -> bool {
            self.show_travel
        }
        fn show_performance(&self) -> bool {
            false
        }
        fn show_executed(&self) -> bool {
            false
        }
        fn toolpath(&self) -> Option<Arc<dyn ToolpathSource>> {
            self.path.read().clone()
        }
        fn begin_jog(&self, _target: WorldPoint, _reverse: bool) {}
    }

    fn loaded(show_travel: bool) -> (Machine, Arc<GrowingPath>) {
        let path = Arc::new(GrowingPath {
            expected: 4,
            ..Default::default()
        });
        path.push(MotionSegment::travel(WorldPoint::new(0.0, 0.0), WorldPoint::new(5.0, 0.0)));
        path.push(MotionSegment::cut(WorldPoint::new(5.0, 0.0), WorldPoint::new(5.0, 5.0), 0.8));
        let machine = Machine {
            path: RwLock::new(Some(path.clone() as Arc<dyn ToolpathSource>)),
            show_travel,
        };
        (machine, path)
    }

    fn cache() -> (SceneCache, Arc<Mutex<SceneStats>>) {
        let stats = Arc::new(Mutex::new(SceneStats::default()));
        (SceneCache::new(Arc::clone(&stats)), stats)
    }

    // ── reload ─────────────────────────────────────────────────────────

    #[test]
    fn one_reload_request_rebuilds_once() {
        let (machine, _path) = loaded(true);
        let (mut cache, stats) = cache();
        let mailbox = RequestMailbox::new();
        let style = LayerStyle::default();

        mailbox.request_reload();
        mailbox.request_reload();

        cache.apply(mailbox.take(), &machine, &style);
        assert!(mailbox.peek().is_empty());
        let first = stats.lock().clone();
        assert_eq!(first.rebuilds, 1);

        for _ in 0..5 {
            cache.apply(mailbox.take(), &machine, &style);
        }
        let later = stats.lock().clone();
        assert_eq!(later.rebuilds, 1);
        assert_eq!(later.powered.map(|l| l.id), first.powered.map(|l| l.id));

        mailbox.request_reload();
        cache.apply(mailbox.take(), &machine, &style);
        let reloaded = stats.lock().clone();
        assert_eq!(reloaded.rebuilds, 2);
        assert_ne!(reloaded.powered.map(|l| l.id), first.powered.map(|l| l.id));
        assert_ne!(reloaded.travel.map(|l| l.id), first.travel.map(|l| l.id));
    }

    #[test]
    fn reload_without_toolpath_leaves_no_layers() {
        let machine = Machine::default();
        let (mut cache, stats) = cache();
        cache.apply(
            Requests {
                reload: true,
                full_invalidate: false,
            },
            &machine,
            &LayerStyle::default(),
        );
        assert_eq!(cache.layers().count(), 0);
        assert_eq!(stats.lock().vertex_count(), 0);
        assert_eq!(stats.lock().loading_percentage(true), None);
    }

    // ── invalidation ───────────────────────────────────────────────────

    #[test]
    fn streaming_segments_are_appended_each_cycle() {
        let (machine, path) = loaded(true);
        let (mut cache, stats) = cache();
        let style = LayerStyle::default();
        cache.apply(
            Requests {
                reload: true,
                full_invalidate: false,
            },
            &machine,
            &style,
        );
        assert_eq!(stats.lock().vertex_count(), 2);
        assert_eq!(stats.lock().loading_percentage(true), Some(50.0));

        path.push(MotionSegment::cut(WorldPoint::new(5.0, 5.0), WorldPoint::new(0.0, 5.0), 0.8));
        path.push(MotionSegment::cut(WorldPoint::new(0.0, 5.0), WorldPoint::new(0.0, 0.0), 0.8));
        cache.apply(Requests::default(), &machine, &style);

        let s = stats.lock().clone();
        assert_eq!(s.vertex_count(), 6);
        assert_eq!(s.powered.map(|l| l.revision), Some(0));
        assert_eq!(s.loading_percentage(true), None);
    }

    #[test]
    fn full_invalidate_bumps_revisions() {
        let (machine, _path) = loaded(false);
        let (mut cache, stats) = cache();
        let style = LayerStyle::default();
        cache.apply(
            Requests {
                reload: true,
                full_invalidate: false,
            },
            &machine,
            &style,
        );
        cache.apply(
            Requests {
                reload: false,
                full_invalidate: true,
            },
            &machine,
            &style,
        );
        let s = stats.lock().clone();
        assert_eq!(s.powered.map(|l| l.revision), Some(1));
        assert_eq!(s.travel.map(|l| l.revision), Some(1));
        assert_eq!(s.rebuilds, 1);
    }

    #[test]
    fn hidden_travel_is_not_drawn() {
        let (machine, _path) = loaded(false);
        let (mut cache, stats) = cache();
        cache.apply(
            Requests {
                reload: true,
                full_invalidate: false,
            },
            &machine,
            &LayerStyle::default(),
        );
        assert_eq!(cache.batches(false).len(), 1);
        assert_eq!(cache.batches(true).len(), 2);
        assert_eq!(stats.lock().travel.map(|l| l.vertex_count), Some(0));
    }

    // ── loading percentage ─────────────────────────────────────────────

    fn layer(p: f64) -> Option<LayerStats> {
        Some(LayerStats {
            id: LayerId(0),
            revision: 0,
            vertex_count: 0,
            loading_percentage: p,
        })
    }

    #[test]
    fn loading_percentage_rules() {
        let s = SceneStats {
            rebuilds: 1,
            powered: layer(100.0),
            travel: layer(50.0),
        };
        assert_eq!(s.loading_percentage(true), Some(75.0));
        assert_eq!(s.loading_percentage(false), None);

        let s = SceneStats {
            rebuilds: 1,
            powered: layer(40.0),
            travel: layer(60.0),
        };
        assert_eq!(s.loading_percentage(true), Some(50.0));
        assert_eq!(s.loading_percentage(false), Some(40.0));
    }
}
