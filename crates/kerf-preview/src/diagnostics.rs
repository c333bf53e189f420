//! Backend identification and error sampling.

use std::fmt;

use kerf_engine::device::AdapterChoice;

use crate::error::PreviewError;

/// Which rendering backend the loop ended up with.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RendererType {
    /// GPU adapter.
    Hardware,
    /// CPU fallback adapter.
    Software,
}

impl RendererType {
    /// Preference order at startup.
    pub const FALLBACK_ORDER: [RendererType; 2] = [RendererType::Hardware, RendererType::Software];

    pub const fn label(self) -> &'static str {
        match self {
            RendererType::Hardware => "hardware",
            RendererType::Software => "software",
        }
    }
}

impl From<RendererType> for AdapterChoice {
    fn from(value: RendererType) -> Self {
        match value {
            RendererType::Hardware => AdapterChoice::Hardware,
            RendererType::Software => AdapterChoice::Software,
        }
    }
}

impl fmt::Display for RendererType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Snapshot of what the render loop knows about its backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendDiagnostics {
    /// `None` until a backend came up.
    pub renderer_type: Option<RendererType>,
    pub adapter: String,
    pub vendor: String,
    pub driver: String,
    pub backend: String,
    /// First non-fatal error: a failed primary backend or a call-level error.
    pub first_error: Option<String>,
    /// Terminal fault, if the loop stopped on one.
    pub fatal: Option<String>,
}

impl BackendDiagnostics {
    /// The fatal fault if there is one, else the first recorded error.
    pub fn message(&self) -> Option<&str> {
        self.fatal.as_deref().or(self.first_error.as_deref())
    }

    /// Records `err` only if nothing was recorded before.
    pub fn note_first_error(&mut self, err: impl Into<String>) {
        if self.first_error.is_none() {
            self.first_error = Some(err.into());
        }
    }
}

/// Stops logging call-level errors after this many.
pub const ERROR_LOG_CAP: u32 = 3;

/// Call-level error sampler: keeps the first error, logs only a few.
#[derive(Debug, Default)]
pub struct ErrorSampler {
    seen: u32,
}

impl ErrorSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one error. Returns whether it was logged.
    pub fn sample(&mut self, err: &PreviewError, diagnostics: &mut BackendDiagnostics) -> bool {
        diagnostics.note_first_error(err.to_string());
        if self.seen >= ERROR_LOG_CAP {
            return false;
        }
        self.seen += 1;
        log::warn!("{err} ({}/{ERROR_LOG_CAP})", self.seen);
        if self.seen == ERROR_LOG_CAP {
            log::warn!("further backend errors will not be logged");
        }
        true
    }

    #[inline]
    pub fn seen(&self) -> u32 {
        self.seen
    }
}
