//! Presentation-side facade over the preview.
//!
//! `PreviewControl` lives on the UI thread. It turns input into camera
//! updates, forwards collaborator notifications to the render thread as
//! requests, and composites the latest published frame with the HUD.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread::JoinHandle;

use kerf_engine::canvas::Canvas;
use kerf_engine::input::{InputEvent, InputFrame, InputState, MouseButton, MouseButtonState};
use kerf_engine::logging::init_logging;
use kerf_engine::text::FontSystem;
use kerf_engine::time::{FrameClock, MovingAverage};

use crate::camera::{Camera, WorldPoint};
use crate::collab::{MachineState, PreviewSettings, Settings};
use crate::config::{Padding, PreviewConfig};
use crate::diagnostics::BackendDiagnostics;
use crate::error::{PreviewError, Result, panic_message};
use crate::frame::Frame;
use crate::hud::{FontMeasure, HudInput, HudPainter, PerfSnapshot};
use crate::readout::LiveReadout;
use crate::render_loop::{BackendFactory, LabelFont, LoopSettings, LoopState, RenderLoop, WgpuFactory};
use crate::scene::{ColorScheme, SceneStats};
use crate::shared::{PreviewShared, SceneParams};

/// Placeholder shown until the first frame is published.
pub const NOTHING_TO_DRAW: &str = "Nothing to draw";

/// What one call to [`PreviewControl::paint`] put on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintOutcome {
    /// Latest frame with the HUD on top.
    Frame { generation: u64 },
    /// No frame published yet; placeholder panel shown.
    NothingToDraw,
    /// HUD compositing failed on this paint; error panel shown.
    DrawFailed(PreviewError),
    /// The render loop is gone; error panel shown.
    Faulted(PreviewError),
}

/// Interactive toolpath preview.
///
/// Owns the render thread: dropping the control stops it after its current
/// cycle and releases the published raster.
pub struct PreviewControl {
    shared: Arc<PreviewShared>,
    machine: Arc<dyn MachineState>,
    settings_source: Arc<dyn Settings>,
    settings: PreviewSettings,
    padding: Padding,

    input: InputState,
    input_frame: InputFrame,
    pointer_world: Option<WorldPoint>,
    readout: LiveReadout,

    paint_clock: FrameClock,
    paint_interval: MovingAverage,
    painter: HudPainter,

    render_thread: Option<JoinHandle<()>>,
}

impl PreviewControl {
    /// Creates the control with the wgpu backend.
    pub fn new(config: PreviewConfig, machine: Arc<dyn MachineState>, settings: Arc<dyn Settings>) -> Result<Self> {
        init_configured_logging(&config);
        let fonts = load_fonts(&config);
        let factory = WgpuFactory::new(config.offscreen.clone(), Arc::clone(&fonts));
        Self::build(config, machine, settings, fonts, Box::new(factory))
    }

    /// Creates the control with any backend factory.
    pub fn with_backend(
        config: PreviewConfig,
        machine: Arc<dyn MachineState>,
        settings: Arc<dyn Settings>,
        factory: Box<dyn BackendFactory>,
    ) -> Result<Self> {
        init_configured_logging(&config);
        let fonts = load_fonts(&config);
        Self::build(config, machine, settings, fonts, factory)
    }

    fn build(
        config: PreviewConfig,
        machine: Arc<dyn MachineState>,
        settings_source: Arc<dyn Settings>,
        fonts: Arc<FontSystem>,
        factory: Box<dyn BackendFactory>,
    ) -> Result<Self> {
        let settings = PreviewSettings::read(settings_source.as_ref());
        let camera = Camera::new(config.initial_size, config.padding, config.max_extent);
        let shared = Arc::new(PreviewShared::new(
            camera,
            SceneParams {
                colors: ColorScheme::default(),
                line_width: settings.preview_line_width,
                show_executed: machine.show_executed(),
            },
        ));
        // Picks up a toolpath loaded before the control existed.
        shared.mailbox.request_reload();

        let loop_settings = LoopSettings {
            frame_interval: config.frame_interval,
            pointer_size: config.pointer_size,
            travel_line_width: config.travel_line_width,
            label_font: LabelFont::primary(Arc::clone(&fonts), config.label_font_size),
        };
        let render_thread = RenderLoop::new(Arc::clone(&shared), Arc::clone(&machine), factory, loop_settings)
            .spawn()
            .map_err(|e| PreviewError::RenderFault(format!("failed to spawn render thread: {e}")))?;

        let hud_font = fonts.primary().map(|id| FontMeasure {
            fonts: Arc::clone(&fonts),
            id,
            size: config.hud_font_size,
        });

        let mut readout = LiveReadout::default();
        readout.poll(machine.as_ref());

        Ok(Self {
            shared,
            machine,
            settings_source,
            settings,
            padding: config.padding,
            input: InputState::default(),
            input_frame: InputFrame::default(),
            pointer_world: None,
            readout,
            paint_clock: FrameClock::new(),
            paint_interval: MovingAverage::default(),
            painter: HudPainter::new(hud_font, config.hud_font_size),
            render_thread: Some(render_thread),
        })
    }

    // ── input ─────────────────────────────────────────────────────────────

    /// Applies one pointer event: left-drag pans, wheel zooms about the
    /// pointer, double-click jogs.
    pub fn handle_event(&mut self, ev: InputEvent) {
        self.input_frame.clear();
        self.input.apply_event(&mut self.input_frame, ev);

        match ev {
            InputEvent::PointerMoved { x, y } => {
                // Read under the camera the user is looking at, before the pan.
                self.pointer_world = Some(self.screen_to_world(x, y));
                if let Some((dx, dy)) = self.input_frame.drag_delta
                    && self.input.button_down(MouseButton::Left)
                {
                    self.shared
                        .camera
                        .update(|c| c.pan(f64::from(dx), f64::from(dy)));
                }
            }

            InputEvent::PointerButton {
                state: MouseButtonState::Pressed,
                x,
                y,
                ..
            } => {
                self.pointer_world = Some(self.screen_to_world(x, y));
            }

            InputEvent::PointerButton {
                state: MouseButtonState::Released,
                ..
            }
            | InputEvent::PointerLeft => {
                self.pointer_world = None;
            }

            InputEvent::MouseWheel { delta, .. } => {
                let Some(pivot) = self.pointer_world else { return };
                let factor = Camera::zoom_factor(f64::from(delta.steps()));
                self.shared.camera.update(|c| c.zoom(pivot, factor));
            }

            InputEvent::DoubleClick { button, x, y } => {
                if !self.settings.click_to_jog {
                    return;
                }
                let target = self.screen_to_world(x, y);
                self.pointer_world = Some(target);
                log::debug!("jog to ({:.3}, {:.3})", target.x, target.y);
                self.machine
                    .begin_jog(target, button == MouseButton::Right);
            }
        }
    }

    /// The host surface changed size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.shared.camera.update(|c| c.on_resize(width, height));
    }

    // ── notifications ─────────────────────────────────────────────────────

    /// A new toolpath was loaded: rebuild the scene and frame it.
    pub fn file_loaded(&mut self) {
        self.shared.mailbox.request_reload();
        self.auto_fit();
    }

    /// Frames the current toolpath, or the default area when there is none.
    pub fn auto_fit(&mut self) {
        let content = self
            .machine
            .toolpath()
            .and_then(|path| path.bounding_box());
        self.shared.camera.update(|c| c.auto_fit(content));
    }

    pub fn colors_changed(&mut self, colors: ColorScheme) {
        self.shared.params.write().colors = colors;
        self.shared.mailbox.request_full_invalidate();
    }

    /// Re-reads preferences; width or executed-coloring changes rebuild the scene.
    pub fn settings_changed(&mut self) {
        self.settings = PreviewSettings::read(self.settings_source.as_ref());
        let show_executed = self.machine.show_executed();

        let rebuild = {
            let mut params = self.shared.params.write();
            let changed = params.line_width != self.settings.preview_line_width
                || params.show_executed != show_executed;
            params.line_width = self.settings.preview_line_width;
            params.show_executed = show_executed;
            changed
        };
        if rebuild {
            self.shared.mailbox.request_full_invalidate();
        }
        self.shared.request_repaint();
    }

    pub fn invalidate_all(&mut self) {
        self.shared.mailbox.request_full_invalidate();
    }

    /// Polls live machine values for the HUD.
    pub fn timer_update(&mut self) {
        self.readout.poll(self.machine.as_ref());
        self.shared.request_repaint();
    }

    // ── paint ─────────────────────────────────────────────────────────────

    /// Blits the latest frame onto `canvas` and composites the HUD.
    ///
    /// `canvas` is resized to the control size. Never blocks on the render
    /// thread beyond the frame copy.
    pub fn paint(&mut self, canvas: &mut Canvas) -> PaintOutcome {
        let tick = self.paint_clock.tick();
        if tick.has_interval() {
            self.paint_interval.push(tick.dt_ms);
        }

        let camera = self.shared.camera.snapshot();
        let (w, h) = camera.size();
        canvas.resize(w, h);
        let colors = self.shared.params.read().colors;
        canvas.clear(colors.background);

        let generation = self
            .shared
            .publisher
            .with_latest(|frame| {
                canvas.blit(&frame.pixels, frame.width, frame.height);
                frame.generation
            });

        let hud = self.hud_input();
        let drawn = panic::catch_unwind(AssertUnwindSafe(|| {
            self.painter
                .paint_hud(canvas, &hud, self.padding, &colors);
        }));
        let draw_error = drawn.err().map(|payload| {
            let msg = panic_message(payload.as_ref());
            log::warn!("HUD drawing failed: {msg}");
            PreviewError::Draw(msg)
        });

        if let Some(fault) = self.shared.fault.lock().clone() {
            self.painter.paint_error(canvas, &fault.to_string());
            return PaintOutcome::Faulted(fault);
        }
        if let Some(err) = draw_error {
            self.painter.paint_error(canvas, &err.to_string());
            return PaintOutcome::DrawFailed(err);
        }
        match generation {
            Some(generation) => PaintOutcome::Frame { generation },
            None => {
                self.painter.paint_error(canvas, NOTHING_TO_DRAW);
                PaintOutcome::NothingToDraw
            }
        }
    }

    fn hud_input(&self) -> HudInput {
        let machine = self.machine.as_ref();
        let stats = self.shared.stats.lock().clone();
        let perf = machine.show_performance().then(|| PerfSnapshot {
            vertex_count: stats.vertex_count(),
            render_ms: self.shared.render_time.lock().average(),
            paint_interval_ms: self.paint_interval.average(),
        });
        HudInput {
            readout: self.readout,
            pointer: self.pointer_world,
            force_z: self.settings.enable_z_jog,
            perf,
            loading: stats.loading_percentage(machine.show_travel()),
        }
    }

    // ── queries ───────────────────────────────────────────────────────────

    pub fn camera(&self) -> Camera {
        self.shared.camera.snapshot()
    }

    /// World position under the pointer while it is over the canvas.
    pub fn pointer_world(&self) -> Option<WorldPoint> {
        self.pointer_world
    }

    pub fn readout(&self) -> LiveReadout {
        self.readout
    }

    pub fn settings(&self) -> PreviewSettings {
        self.settings
    }

    pub fn loop_state(&self) -> LoopState {
        self.shared.state.load()
    }

    pub fn diagnostics(&self) -> BackendDiagnostics {
        self.shared.diagnostics.lock().clone()
    }

    /// Fatal fault if any, else the first backend error.
    pub fn diagnostic_message(&self) -> Option<String> {
        self.shared
            .diagnostics
            .lock()
            .message()
            .map(str::to_owned)
    }

    pub fn scene_stats(&self) -> SceneStats {
        self.shared.stats.lock().clone()
    }

    pub fn latest_frame(&self) -> Option<Frame> {
        self.shared.publisher.snapshot()
    }

    /// Generation of the latest published frame; 0 before the first.
    pub fn frame_generation(&self) -> u64 {
        self.shared.publisher.generation()
    }

    /// Changes whenever the presentation side should repaint.
    pub fn repaint_generation(&self) -> u64 {
        self.shared.repaint.load(Ordering::Acquire)
    }

    // ── helpers ───────────────────────────────────────────────────────────

    fn screen_to_world(&self, x: f32, y: f32) -> WorldPoint {
        self.shared
            .camera
            .snapshot()
            .screen_to_world(f64::from(x), f64::from(y))
    }
}

impl Drop for PreviewControl {
    fn drop(&mut self) {
        self.shared.stop.store(true, Ordering::Release);
        if let Some(handle) = self.render_thread.take() {
            handle.thread().unpark();
            if handle.join().is_err() {
                log::error!("render thread panicked during shutdown");
            }
        }
        self.shared.publisher.clear();
    }
}

fn init_configured_logging(config: &PreviewConfig) {
    if let Some(logging) = config.logging.clone() {
        init_logging(logging);
    }
}

fn load_fonts(config: &PreviewConfig) -> Arc<FontSystem> {
    let mut fonts = FontSystem::new();
    if let Some(bytes) = config.font.as_deref()
        && let Err(err) = fonts.load_font(bytes)
    {
        log::warn!("preview font rejected, drawing without text: {err}");
    }
    Arc::new(fonts)
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::thread;
    use std::time::{Duration, Instant};

    use kerf_engine::input::MouseWheelDelta;
    use parking_lot::Mutex;

    use super::*;
    use crate::camera::WorldRect;
    use crate::collab::{MotionSegment, Point3, ToolpathSource};
    use crate::diagnostics::RendererType;
    use crate::render_loop::{FakeFactory, RasterBackend, Script};

    struct FixedPath(Vec<MotionSegment>);

    impl ToolpathSource for FixedPath {
        fn len(&self) -> usize {
            self.0.len()
        }
        fn expected_len(&self) -> usize {
            self.0.len()
        }
        fn read_segments(&self, start: usize, out: &mut Vec<MotionSegment>) {
            out.extend_from_slice(&self.0[start.min(self.0.len())..]);
        }
        fn bounding_box(&self) -> Option<WorldRect> {
            Some(WorldRect::from_bounds(0.0, 40.0, 0.0, 20.0))
        }
    }

    #[derive(Default)]
    struct TestMachine {
        jogs: Mutex<Vec<(WorldPoint, bool)>>,
        path: Mutex<Option<Arc<dyn ToolpathSource>>>,
        show_performance: bool,
    }

    impl MachineState for TestMachine {
        fn machine_position(&self) -> Point3 {
            Point3::new(1.0, 2.0, 0.0)
        }
        fn work_position(&self) -> Point3 {
            Point3::new(1.0, 2.0, 0.0)
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
            true
        }
        fn show_performance(&self) -> bool {
            self.show_performance
        }
        fn show_executed(&self) -> bool {
            false
        }
        fn toolpath(&self) -> Option<Arc<dyn ToolpathSource>> {
            self.path.lock().clone()
        }
        fn begin_jog(&self, target: WorldPoint, reverse: bool) {
            self.jogs.lock().push((target, reverse));
        }
    }

    #[derive(Default)]
    struct TestSettings(Mutex<PreviewSettings>);

    impl Settings for TestSettings {
        fn enable_z_jog(&self) -> bool {
            self.0.lock().enable_z_jog
        }
        fn click_to_jog(&self) -> bool {
            self.0.lock().click_to_jog
        }
        fn preview_line_width(&self) -> f32 {
            self.0.lock().preview_line_width
        }
    }

    /// Holds backend creation until the test opens the gate.
    struct GatedFactory {
        gate: mpsc::Receiver<()>,
        inner: FakeFactory,
    }

    impl BackendFactory for GatedFactory {
        fn create(&mut self, kind: RendererType, size: (u32, u32)) -> anyhow::Result<Box<dyn RasterBackend>> {
            let _ = self.gate.recv();
            self.inner.create(kind, size)
        }
    }

    fn config() -> PreviewConfig {
        PreviewConfig {
            padding: Padding::new(0, 0, 0, 0),
            frame_interval: Duration::from_millis(1),
            initial_size: (200, 100),
            ..PreviewConfig::default()
        }
    }

    fn control_with(
        machine: Arc<TestMachine>,
        settings: Arc<TestSettings>,
        factory: Box<dyn BackendFactory>,
    ) -> PreviewControl {
        PreviewControl::with_backend(config(), machine, settings, factory).unwrap()
    }

    fn control(machine: Arc<TestMachine>) -> (PreviewControl, Arc<Script>) {
        let script = Arc::new(Script::default());
        let factory = Box::new(FakeFactory(Arc::clone(&script)));
        (control_with(machine, Arc::default(), factory), script)
    }

    fn wait_until(mut f: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !f() {
            assert!(Instant::now() < deadline, "timed out");
            thread::sleep(Duration::from_millis(1));
        }
    }

    fn press(button: MouseButton, x: f32, y: f32) -> InputEvent {
        InputEvent::PointerButton {
            button,
            state: MouseButtonState::Pressed,
            x,
            y,
        }
    }

    fn wheel_up(x: f32, y: f32) -> InputEvent {
        InputEvent::MouseWheel {
            delta: MouseWheelDelta::Lines { x: 0.0, y: 1.0 },
            x,
            y,
        }
    }

    // ── input ──────────────────────────────────────────────────────────

    #[test]
    fn left_drag_pans() {
        let (mut c, _) = control(Arc::default());
        let before = c.camera().bounds();

        c.handle_event(press(MouseButton::Left, 100.0, 50.0));
        c.handle_event(InputEvent::PointerMoved { x: 110.0, y: 50.0 });

        let after = c.camera().bounds();
        assert!(after.left < before.left);
        assert!((after.width() - before.width()).abs() < 1e-9);
        assert_eq!(after.top, before.top);
    }

    #[test]
    fn drag_reports_pointer_under_pre_pan_camera() {
        let (mut c, _) = control(Arc::default());
        c.handle_event(press(MouseButton::Left, 100.0, 50.0));
        let before = c.camera();
        let expected = before.screen_to_world(110.0, 50.0);

        c.handle_event(InputEvent::PointerMoved { x: 110.0, y: 50.0 });

        assert_ne!(c.camera(), before);
        assert_eq!(c.pointer_world(), Some(expected));
    }

    #[test]
    fn input_burst_keeps_render_cadence() {
        let script = Arc::new(Script::default());
        let config = PreviewConfig {
            frame_interval: Duration::from_millis(30),
            ..config()
        };
        let mut c = PreviewControl::with_backend(
            config,
            Arc::new(TestMachine::default()),
            Arc::new(TestSettings::default()),
            Box::new(FakeFactory(script)),
        )
        .unwrap();
        wait_until(|| c.frame_generation() >= 1);

        let before = c.frame_generation();
        let started = Instant::now();
        c.handle_event(press(MouseButton::Left, 100.0, 50.0));
        for i in 0..100 {
            c.handle_event(InputEvent::PointerMoved {
                x: 100.0 + i as f32 * 0.1,
                y: 50.0,
            });
            c.handle_event(wheel_up(100.0, 50.0));
        }
        c.invalidate_all();
        let published = c.frame_generation() - before;

        // One frame per interval, plus one already in flight.
        let intervals = (started.elapsed().as_millis() / 30) as u64;
        assert!(published <= intervals + 2, "{published} frames in {intervals} intervals");
    }

    #[test]
    fn right_drag_does_not_pan() {
        let (mut c, _) = control(Arc::default());
        let before = c.camera().bounds();

        c.handle_event(press(MouseButton::Right, 100.0, 50.0));
        c.handle_event(InputEvent::PointerMoved { x: 140.0, y: 70.0 });

        assert_eq!(c.camera().bounds(), before);
        assert!(c.pointer_world().is_some());
    }

    #[test]
    fn release_and_leave_forget_pointer() {
        let (mut c, _) = control(Arc::default());
        c.handle_event(InputEvent::PointerMoved { x: 10.0, y: 10.0 });
        assert!(c.pointer_world().is_some());
        c.handle_event(InputEvent::PointerLeft);
        assert_eq!(c.pointer_world(), None);

        c.handle_event(press(MouseButton::Left, 10.0, 10.0));
        c.handle_event(InputEvent::PointerButton {
            button: MouseButton::Left,
            state: MouseButtonState::Released,
            x: 10.0,
            y: 10.0,
        });
        assert_eq!(c.pointer_world(), None);
    }

    #[test]
    fn wheel_without_pointer_is_ignored() {
        let (mut c, _) = control(Arc::default());
        let before = c.camera().bounds();
        c.handle_event(wheel_up(50.0, 50.0));
        assert_eq!(c.camera().bounds(), before);
    }

    #[test]
    fn wheel_zooms_about_pointer() {
        let (mut c, _) = control(Arc::default());
        c.handle_event(InputEvent::PointerMoved { x: 50.0, y: 25.0 });
        let pivot = c.pointer_world().unwrap();
        let before = c.camera();

        c.handle_event(wheel_up(50.0, 25.0));

        let after = c.camera();
        assert!(after.bounds().width() < before.bounds().width());
        let (sx, sy) = after.world_to_screen(pivot);
        assert!((sx - 50.0).abs() < 1e-6);
        assert!((sy - 25.0).abs() < 1e-6);
    }

    #[test]
    fn double_click_jogs() {
        let machine = Arc::new(TestMachine::default());
        let (mut c, _) = control(Arc::clone(&machine));

        c.handle_event(InputEvent::DoubleClick {
            button: MouseButton::Left,
            x: 20.0,
            y: 30.0,
        });
        c.handle_event(InputEvent::DoubleClick {
            button: MouseButton::Right,
            x: 20.0,
            y: 30.0,
        });

        let expected = c.camera().screen_to_world(20.0, 30.0);
        let jogs = machine.jogs.lock().clone();
        assert_eq!(jogs, vec![(expected, false), (expected, true)]);
    }

    #[test]
    fn double_click_respects_setting() {
        let machine = Arc::new(TestMachine::default());
        let settings = Arc::new(TestSettings::default());
        settings.0.lock().click_to_jog = false;
        let script = Arc::new(Script::default());
        let mut c = control_with(Arc::clone(&machine), settings, Box::new(FakeFactory(script)));

        c.handle_event(InputEvent::DoubleClick {
            button: MouseButton::Left,
            x: 20.0,
            y: 30.0,
        });
        assert!(machine.jogs.lock().is_empty());
    }

    #[test]
    fn resize_updates_camera() {
        let (mut c, _) = control(Arc::default());
        c.resize(400, 200);
        assert_eq!(c.camera().size(), (400, 200));
        c.resize(0, 200);
        assert_eq!(c.camera().size(), (400, 200));
    }

    // ── notifications ──────────────────────────────────────────────────

    #[test]
    fn file_loaded_rebuilds_and_fits() {
        let machine = Arc::new(TestMachine::default());
        let (mut c, _) = control(Arc::clone(&machine));
        wait_until(|| c.scene_stats().rebuilds >= 1);

        *machine.path.lock() = Some(Arc::new(FixedPath(vec![
            MotionSegment::cut(WorldPoint::new(0.0, 0.0), WorldPoint::new(40.0, 20.0), 1.0),
            MotionSegment::travel(WorldPoint::new(40.0, 20.0), WorldPoint::new(0.0, 0.0)),
        ])));
        c.file_loaded();

        let b = c.camera().bounds();
        assert!(b.left <= 0.0 && b.right >= 40.0);
        assert!(b.bottom <= 0.0 && b.top >= 20.0);

        wait_until(|| c.scene_stats().rebuilds >= 2 && c.scene_stats().powered.is_some());
        assert_eq!(c.scene_stats().vertex_count(), 2);
    }

    #[test]
    fn settings_change_updates_line_width() {
        let settings = Arc::new(TestSettings::default());
        let script = Arc::new(Script::default());
        let mut c = control_with(Arc::default(), Arc::clone(&settings), Box::new(FakeFactory(script)));
        wait_until(|| c.scene_stats().rebuilds >= 1);

        c.settings_changed();
        assert!(c.shared.mailbox.peek().is_empty());

        settings.0.lock().preview_line_width = 2.5;
        c.settings_changed();
        assert_eq!(c.settings().preview_line_width, 2.5);
        assert_eq!(c.shared.params.read().line_width, 2.5);
    }

    #[test]
    fn colors_change_is_shared() {
        let (mut c, _) = control(Arc::default());
        c.colors_changed(ColorScheme::light());
        assert_eq!(c.shared.params.read().colors, ColorScheme::light());
    }

    #[test]
    fn timer_update_requests_repaint() {
        let (mut c, _) = control(Arc::default());
        let before = c.repaint_generation();
        c.timer_update();
        assert!(c.repaint_generation() > before);
        assert_eq!(c.readout().work, Point3::new(1.0, 2.0, 0.0));
    }

    // ── paint ──────────────────────────────────────────────────────────

    #[test]
    fn paint_shows_placeholder_then_frame() {
        let (tx, rx) = mpsc::channel();
        let script = Arc::new(Script::default());
        let factory = GatedFactory {
            gate: rx,
            inner: FakeFactory(Arc::clone(&script)),
        };
        let mut c = control_with(Arc::default(), Arc::default(), Box::new(factory));
        let mut canvas = Canvas::new(1, 1);

        assert_eq!(c.paint(&mut canvas), PaintOutcome::NothingToDraw);
        assert_eq!((canvas.width(), canvas.height()), (200, 100));

        tx.send(()).unwrap();
        wait_until(|| c.latest_frame().is_some());
        match c.paint(&mut canvas) {
            PaintOutcome::Frame { generation } => assert!(generation >= 1),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn fault_shows_on_every_paint() {
        let script = Arc::new(Script::default());
        script
            .fail_create
            .lock()
            .extend([RendererType::Hardware, RendererType::Software]);
        let mut c = control_with(Arc::default(), Arc::default(), Box::new(FakeFactory(script)));
        wait_until(|| c.loop_state() == LoopState::Faulted);

        let mut canvas = Canvas::new(1, 1);
        for _ in 0..3 {
            assert!(matches!(c.paint(&mut canvas), PaintOutcome::Faulted(PreviewError::ContextInit { .. })));
        }
        assert!(c.diagnostic_message().unwrap().contains("no rendering backend"));
    }

    #[test]
    fn fault_overlay_wins_over_last_frame() {
        let script = Arc::new(Script::default());
        *script.fail_render_at.lock() = Some(3);
        let mut c = control_with(Arc::default(), Arc::default(), Box::new(FakeFactory(script)));
        wait_until(|| c.loop_state() == LoopState::Faulted);

        assert_eq!(c.frame_generation(), 2);
        assert!(c.latest_frame().is_some());

        let mut canvas = Canvas::new(1, 1);
        for _ in 0..3 {
            match c.paint(&mut canvas) {
                PaintOutcome::Faulted(err) => {
                    assert_eq!(err.to_string(), "render loop fault: rendering frame: device lost");
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn first_paint_interval_is_not_sampled() {
        let (mut c, _) = control(Arc::default());
        let mut canvas = Canvas::new(1, 1);
        c.paint(&mut canvas);
        assert!(c.paint_interval.is_empty());
        c.paint(&mut canvas);
        assert_eq!(c.paint_interval.len(), 1);
    }

    #[test]
    fn performance_block_reads_stats() {
        let machine = Arc::new(TestMachine {
            show_performance: true,
            ..TestMachine::default()
        });
        let (c, _) = control(machine);
        let hud = c.hud_input();
        assert!(hud.perf.is_some());
        assert_eq!(hud.readout.machine, Point3::new(1.0, 2.0, 0.0));
    }

    // ── lifecycle ──────────────────────────────────────────────────────

    #[test]
    fn drop_stops_render_thread() {
        let (c, _) = control(Arc::default());
        wait_until(|| c.latest_frame().is_some());
        let shared = Arc::clone(&c.shared);

        drop(c);

        assert_eq!(shared.state.load(), LoopState::Stopped);
        assert!(!shared.publisher.has_frame());
    }
}
