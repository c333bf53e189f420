//! Drives the preview headlessly through a short session: a streamed job,
//! pan, zoom, a jog, a theme switch and a resize. Each step is written to a
//! PNG in the output directory (first argument, default `kerf-snapshots`).

mod sim;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use kerf_engine::canvas::Canvas;
use kerf_engine::input::{InputEvent, MouseButton, MouseButtonState, MouseWheelDelta};
use kerf_engine::logging::LoggingConfig;
use kerf_preview::collab::{Point3, PreviewSettings, ToolpathSource};
use kerf_preview::{ColorScheme, PaintOutcome, PreviewConfig, PreviewControl};

use sim::{SimMachine, StreamingPath};

const FRAME_WAIT: Duration = Duration::from_secs(5);

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("kerf-snapshots"));
    std::fs::create_dir_all(&out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    let config = PreviewConfig {
        font: load_font(),
        logging: Some(LoggingConfig::default()),
        ..PreviewConfig::default()
    };

    let machine = Arc::new(SimMachine::new(Point3::new(120.0, 80.0, 0.0)));
    let settings = Arc::new(PreviewSettings {
        preview_line_width: 1.5,
        ..PreviewSettings::default()
    });

    let mut control = PreviewControl::new(config, machine.clone(), settings)?;
    let mut session = Session {
        canvas: Canvas::new(1, 1),
        out_dir,
        shot: 0,
    };

    session.snap(&mut control, "empty")?;

    let (path, segments) = StreamingPath::rosette(6, 720);
    machine.load(path.clone());
    control.file_loaded();
    let loader = path.stream(segments, 400, Duration::from_millis(20));
    session.snap(&mut control, "loading")?;
    if loader.join().is_err() {
        log::warn!("toolpath loader panicked");
    }
    control.invalidate_all();
    settle(&mut control);
    session.snap(&mut control, "loaded")?;

    path.mark_executed(path.len() / 2);
    control.invalidate_all();
    session.snap(&mut control, "executed")?;

    drag(&mut control, (400.0, 300.0), (480.0, 260.0));
    session.snap(&mut control, "panned")?;

    control.handle_event(InputEvent::PointerMoved { x: 420.0, y: 280.0 });
    for _ in 0..4 {
        control.handle_event(InputEvent::MouseWheel {
            delta: MouseWheelDelta::Lines { x: 0.0, y: 1.0 },
            x: 420.0,
            y: 280.0,
        });
    }
    session.snap(&mut control, "zoomed")?;

    control.handle_event(InputEvent::DoubleClick {
        button: MouseButton::Left,
        x: 300.0,
        y: 200.0,
    });
    control.timer_update();
    session.snap(&mut control, "jogged")?;

    control.colors_changed(ColorScheme::light());
    control.auto_fit();
    session.snap(&mut control, "light")?;

    control.resize(1024, 480);
    session.snap(&mut control, "resized")?;

    if let Some(msg) = control.diagnostic_message() {
        log::warn!("renderer reported: {msg}");
    }
    let diag = control.diagnostics();
    log::info!(
        "done: {} renderer on {}, {} snapshots",
        diag.renderer_type.map(|t| t.label()).unwrap_or("no"),
        diag.adapter,
        session.shot
    );
    Ok(())
}

struct Session {
    canvas: Canvas,
    out_dir: PathBuf,
    shot: u32,
}

impl Session {
    /// Waits for a frame newer than the current one, paints and saves it.
    fn snap(&mut self, control: &mut PreviewControl, name: &str) -> Result<()> {
        wait_for_frame(control);
        control.timer_update();

        let outcome = control.paint(&mut self.canvas);
        match &outcome {
            PaintOutcome::Frame { generation } => log::info!("{name}: frame {generation}"),
            PaintOutcome::NothingToDraw => log::info!("{name}: nothing to draw yet"),
            PaintOutcome::DrawFailed(err) => log::warn!("{name}: {err}"),
            PaintOutcome::Faulted(err) => log::error!("{name}: {err}"),
        }

        self.shot += 1;
        let file = self.out_dir.join(format!("{:02}-{name}.png", self.shot));
        save_png(&self.canvas, &file)
    }
}

/// Blocks until a frame rendered after this call has been published.
fn wait_for_frame(control: &PreviewControl) -> bool {
    // The next frame may already be in flight with the previous state.
    let start = control.frame_generation();
    let deadline = Instant::now() + FRAME_WAIT;
    while Instant::now() < deadline {
        if control.frame_generation() > start + 1 {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    log::warn!("no new frame within {FRAME_WAIT:?}");
    false
}

/// Lets the scene finish pulling segments.
fn settle(control: &mut PreviewControl) {
    let deadline = Instant::now() + FRAME_WAIT;
    while Instant::now() < deadline {
        if control.scene_stats().loading_percentage(true).is_none() {
            return;
        }
        thread::sleep(Duration::from_millis(10));
    }
}

fn drag(control: &mut PreviewControl, from: (f32, f32), to: (f32, f32)) {
    control.handle_event(InputEvent::PointerButton {
        button: MouseButton::Left,
        state: MouseButtonState::Pressed,
        x: from.0,
        y: from.1,
    });
    for i in 1..=8 {
        let t = i as f32 / 8.0;
        control.handle_event(InputEvent::PointerMoved {
            x: from.0 + (to.0 - from.0) * t,
            y: from.1 + (to.1 - from.1) * t,
        });
    }
    control.handle_event(InputEvent::PointerButton {
        button: MouseButton::Left,
        state: MouseButtonState::Released,
        x: to.0,
        y: to.1,
    });
}

fn save_png(canvas: &Canvas, file: &Path) -> Result<()> {
    canvas
        .image()
        .save(file)
        .with_context(|| format!("writing {}", file.display()))?;
    log::debug!("wrote {}", file.display());
    Ok(())
}

fn load_font() -> Option<Vec<u8>> {
    [
        "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
        "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    ]
    .iter()
    .find_map(|p| std::fs::read(p).ok())
}
