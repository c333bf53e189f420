use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::Context;

use crate::collab::MachineState;
use crate::diagnostics::{ErrorSampler, RendererType};
use crate::error::PreviewError;
use crate::scene::{LayerStyle, SceneCache};
use crate::shared::PreviewShared;

use super::backend::{BackendFactory, RasterBackend};
use super::compose::{Composer, LabelFont};
use super::state::LoopState;

/// Fixed parameters of the render cadence.
#[derive(Debug, Clone)]
pub struct LoopSettings {
    pub frame_interval: Duration,
    pub pointer_size: f32,
    pub travel_line_width: f32,
    pub label_font: Option<LabelFont>,
}

/// Per-thread state reused across cycles.
struct CycleState {
    cache: SceneCache,
    composer: Composer,
    sampler: ErrorSampler,
    pixels: Vec<u8>,
}

/// The background render loop. Runs on its own thread via [`RenderLoop::spawn`].
pub struct RenderLoop {
    shared: Arc<PreviewShared>,
    machine: Arc<dyn MachineState>,
    factory: Box<dyn BackendFactory>,
    settings: LoopSettings,
}

impl RenderLoop {
    pub(crate) fn new(
        shared: Arc<PreviewShared>,
        machine: Arc<dyn MachineState>,
        factory: Box<dyn BackendFactory>,
        settings: LoopSettings,
    ) -> Self {
        Self {
            shared,
            machine,
            factory,
            settings,
        }
    }

    pub fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("kerf-render".into())
            .spawn(move || self.run())
    }

    /// Runs until stopped or faulted. Every backend call happens on this thread.
    pub fn run(mut self) {
        self.shared.state.store(LoopState::Initializing);

        let init = panic::catch_unwind(AssertUnwindSafe(|| self.init_backend()))
            .unwrap_or_else(|payload| Err(PreviewError::from_panic(payload)));
        let mut backend = match init {
            Ok(backend) => backend,
            Err(err) => {
                self.shared.record_fault(err);
                return;
            }
        };

        self.shared.state.store(LoopState::Running);
        log::info!("render loop running");

        let mut cycle = CycleState {
            cache: SceneCache::new(Arc::clone(&self.shared.stats)),
            composer: Composer::new(self.settings.label_font.clone(), self.settings.pointer_size),
            sampler: ErrorSampler::new(),
            pixels: Vec::new(),
        };

        while !self.shared.stopping() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.cycle(backend.as_mut(), &mut cycle)));
            let fault = match outcome {
                Ok(Ok(())) => None,
                Ok(Err(err)) => Some(PreviewError::from(err)),
                Err(payload) => Some(PreviewError::from_panic(payload)),
            };
            if let Some(err) = fault {
                self.shared.record_fault(err);
                return;
            }

            self.sleep_interval();
        }

        self.shared.state.store(LoopState::Stopped);
        log::info!("render loop stopped");
    }

    /// Sleeps one full frame interval. Only a stop request cuts it short.
    fn sleep_interval(&self) {
        let wake_at = Instant::now() + self.settings.frame_interval;
        while !self.shared.stopping() {
            let now = Instant::now();
            if now >= wake_at {
                break;
            }
            thread::park_timeout(wake_at - now);
        }
    }

    /// Hardware first, then software. Fails only if both do.
    fn init_backend(&mut self) -> Result<Box<dyn RasterBackend>, PreviewError> {
        let size = self.shared.camera.snapshot().size();
        let mut failures = Vec::with_capacity(RendererType::FALLBACK_ORDER.len());

        for kind in RendererType::FALLBACK_ORDER {
            match self.factory.create(kind, size) {
                Ok(backend) => {
                    let info = backend.info();
                    log::info!(
                        "{} renderer: {} ({}, driver {}, {})",
                        info.renderer_type,
                        info.adapter,
                        info.vendor,
                        info.driver,
                        info.backend
                    );
                    let mut diag = self.shared.diagnostics.lock();
                    diag.renderer_type = Some(info.renderer_type);
                    diag.adapter = info.adapter;
                    diag.vendor = info.vendor;
                    diag.driver = info.driver;
                    diag.backend = info.backend;
                    return Ok(backend);
                }
                Err(err) => {
                    let msg = format!("{err:#}");
                    log::warn!("{kind} renderer unavailable: {msg}");
                    self.shared.diagnostics.lock().note_first_error(msg.clone());
                    failures.push(msg);
                }
            }
        }

        let mut failures = failures.into_iter();
        Err(PreviewError::ContextInit {
            primary: failures.next().unwrap_or_default(),
            secondary: failures.next().unwrap_or_default(),
        })
    }

    fn cycle(&mut self, backend: &mut dyn RasterBackend, st: &mut CycleState) -> anyhow::Result<()> {
        let started = Instant::now();

        let camera = self.shared.camera.snapshot();
        let params = self.shared.params.read().clone();
        let requests = self.shared.mailbox.take();
        let machine = self.machine.as_ref();

        let style = LayerStyle::new(
            &params.colors,
            params.line_width,
            self.settings.travel_line_width,
            params.show_executed,
        );
        st.cache.apply(requests, machine, &style);
        st.composer
            .compose(&camera, &params.colors, machine.work_position());

        {
            let layers = st.cache.batches(machine.show_travel());
            let mut scene = st.composer.scene(&camera, params.colors.background, layers);
            backend.render(&mut scene).context("rendering frame")?;
        }

        let read = backend.read_pixels(&mut st.pixels).context("reading frame")?;

        let errors = backend.take_call_errors();
        if !errors.is_empty() {
            let mut diag = self.shared.diagnostics.lock();
            for err in &errors {
                st.sampler.sample(err, &mut diag);
            }
        }

        if let Some((w, h)) = read {
            self.shared
                .publisher
                .publish(w, h, &st.pixels, camera.bounds());
        }

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        self.shared.render_time.lock().push(elapsed_ms);
        self.shared.request_repaint();
        Ok(())
    }
}
