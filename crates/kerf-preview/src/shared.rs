use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use kerf_engine::time::MovingAverage;
use parking_lot::{Mutex, RwLock};

use crate::camera::{Camera, SharedCamera};
use crate::diagnostics::BackendDiagnostics;
use crate::error::PreviewError;
use crate::frame::FramePublisher;
use crate::render_loop::{AtomicLoopState, LoopState};
use crate::scene::{ColorScheme, RequestMailbox, SceneStats};

/// Scene parameters the presentation side changes through notifications.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SceneParams {
    pub colors: ColorScheme,
    pub line_width: f32,
    pub show_executed: bool,
}

/// State shared between the control and its render thread.
///
/// Every lock here guards a copy or a counter update, never a render call.
#[derive(Debug)]
pub(crate) struct PreviewShared {
    pub camera: SharedCamera,
    pub mailbox: RequestMailbox,
    pub publisher: FramePublisher,
    pub stats: Arc<Mutex<SceneStats>>,
    pub diagnostics: Mutex<BackendDiagnostics>,
    pub params: RwLock<SceneParams>,
    pub render_time: Mutex<MovingAverage>,
    pub fault: Mutex<Option<PreviewError>>,
    pub state: AtomicLoopState,
    pub stop: AtomicBool,
    /// Bumped whenever the presentation side should repaint.
    pub repaint: AtomicU64,
}

impl PreviewShared {
    pub fn new(camera: Camera, params: SceneParams) -> Self {
        Self {
            camera: SharedCamera::new(camera),
            mailbox: RequestMailbox::new(),
            publisher: FramePublisher::new(),
            stats: Arc::new(Mutex::new(SceneStats::default())),
            diagnostics: Mutex::new(BackendDiagnostics::default()),
            params: RwLock::new(params),
            render_time: Mutex::new(MovingAverage::default()),
            fault: Mutex::new(None),
            state: AtomicLoopState::new(LoopState::Uninitialized),
            stop: AtomicBool::new(false),
            repaint: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn request_repaint(&self) {
        self.repaint.fetch_add(1, Ordering::Release);
    }

    #[inline]
    pub fn stopping(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// Records a terminal fault once and tells the painter about it.
    pub fn record_fault(&self, err: PreviewError) {
        log::error!("{err}");
        {
            let mut fault = self.fault.lock();
            if fault.is_none() {
                self.diagnostics.lock().fatal = Some(err.to_string());
                *fault = Some(err);
            }
        }
        self.state.store(LoopState::Faulted);
        self.request_repaint();
    }
}
