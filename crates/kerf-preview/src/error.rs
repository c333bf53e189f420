use thiserror::Error;

/// Failures surfaced by the preview.
///
/// Only `ContextInit` and `RenderFault` are terminal for the render loop;
/// `Draw` and `Backend` are reported and the next cycle proceeds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreviewError {
    /// Neither the hardware nor the software backend could be created.
    #[error("no rendering backend available (hardware: {primary}; software: {secondary})")]
    ContextInit { primary: String, secondary: String },

    /// Uncaught failure inside a render cycle, including panics.
    #[error("render loop fault: {0}")]
    RenderFault(String),

    /// HUD compositing failed on the presentation side for one paint.
    #[error("overlay drawing failed: {0}")]
    Draw(String),

    /// Non-fatal backend call error.
    #[error("backend call failed: {0}")]
    Backend(String),
}

impl PreviewError {
    /// Whether the render loop must stop after this error.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(self, PreviewError::ContextInit { .. } | PreviewError::RenderFault(_))
    }

    /// Builds a `RenderFault` from a caught panic payload.
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        PreviewError::RenderFault(panic_message(payload.as_ref()))
    }
}

/// Text carried by a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_owned()
    }
}

impl From<anyhow::Error> for PreviewError {
    /// Errors bubbling out of a render cycle are fatal by definition.
    fn from(err: anyhow::Error) -> Self {
        PreviewError::RenderFault(format!("{err:#}"))
    }
}

pub type Result<T, E = PreviewError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_payloads_become_faults() {
        let caught = std::panic::catch_unwind(|| panic!("device lost")).unwrap_err();
        assert_eq!(PreviewError::from_panic(caught), PreviewError::RenderFault("device lost".into()));

        let caught = std::panic::catch_unwind(|| panic!("lost {}", 2)).unwrap_err();
        assert_eq!(PreviewError::from_panic(caught), PreviewError::RenderFault("lost 2".into()));
    }

    #[test]
    fn anyhow_chain_is_kept() {
        let err = anyhow::anyhow!("map failed").context("reading frame");
        let PreviewError::RenderFault(msg) = PreviewError::from(err) else {
            panic!("expected a render fault");
        };
        assert_eq!(msg, "reading frame: map failed");
    }

    #[test]
    fn fatality() {
        assert!(PreviewError::RenderFault("x".into()).is_fatal());
        assert!(!PreviewError::Draw("x".into()).is_fatal());
        assert!(!PreviewError::Backend("x".into()).is_fatal());
    }
}
