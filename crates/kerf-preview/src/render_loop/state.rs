use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle of the render thread.
///
/// `Uninitialized → Initializing → Running → Stopped`, or `Faulted` from
/// either of the middle two. `Faulted` and `Stopped` are terminal.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoopState {
    Uninitialized = 0,
    Initializing = 1,
    Running = 2,
    Faulted = 3,
    Stopped = 4,
}

impl LoopState {
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, LoopState::Faulted | LoopState::Stopped)
    }

    fn from_u8(v: u8) -> Self {
        match v {
            1 => LoopState::Initializing,
            2 => LoopState::Running,
            3 => LoopState::Faulted,
            4 => LoopState::Stopped,
            _ => LoopState::Uninitialized,
        }
    }
}

#[derive(Debug)]
pub(crate) struct AtomicLoopState(AtomicU8);

impl AtomicLoopState {
    pub fn new(state: LoopState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    #[inline]
    pub fn load(&self) -> LoopState {
        LoopState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Stores `state` unless the current state is terminal.
    pub fn store(&self, state: LoopState) {
        let _ = self
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |cur| {
                (!LoopState::from_u8(cur).is_terminal()).then_some(state as u8)
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_stick() {
        let s = AtomicLoopState::new(LoopState::Uninitialized);
        s.store(LoopState::Initializing);
        s.store(LoopState::Running);
        assert_eq!(s.load(), LoopState::Running);

        s.store(LoopState::Faulted);
        s.store(LoopState::Stopped);
        s.store(LoopState::Running);
        assert_eq!(s.load(), LoopState::Faulted);
    }
}
