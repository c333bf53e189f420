use std::sync::atomic::{AtomicU8, Ordering};

const RELOAD: u8 = 1 << 0;
const FULL_INVALIDATE: u8 = 1 << 1;

/// Pending scene requests taken in one cycle.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Requests {
    pub reload: bool,
    pub full_invalidate: bool,
}

impl Requests {
    #[inline]
    pub fn is_empty(self) -> bool {
        !self.reload && !self.full_invalidate
    }
}

/// Single-slot, edge-triggered mailbox for scene requests.
///
/// Posting the same request several times before it is taken yields one
/// request; a request posted concurrently with `take` lands either in that
/// take or in the next one, never in neither.
#[derive(Debug, Default)]
pub struct RequestMailbox {
    pending: AtomicU8,
}

impl RequestMailbox {
    pub const fn new() -> Self {
        Self {
            pending: AtomicU8::new(0),
        }
    }

    /// Rebuild both layers from the current toolpath.
    pub fn request_reload(&self) {
        self.pending.fetch_or(RELOAD, Ordering::AcqRel);
    }

    /// Refresh colors and rebuild every vertex of both layers.
    pub fn request_full_invalidate(&self) {
        self.pending.fetch_or(FULL_INVALIDATE, Ordering::AcqRel);
    }

    /// Takes and clears everything pending.
    pub fn take(&self) -> Requests {
        let bits = self.pending.swap(0, Ordering::AcqRel);
        Requests {
            reload: bits & RELOAD != 0,
            full_invalidate: bits & FULL_INVALIDATE != 0,
        }
    }

    /// Pending requests without clearing them.
    pub fn peek(&self) -> Requests {
        let bits = self.pending.load(Ordering::Acquire);
        Requests {
            reload: bits & RELOAD != 0,
            full_invalidate: bits & FULL_INVALIDATE != 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    use super::*;

    #[test]
    fn requests_coalesce_and_clear() {
        let mb = RequestMailbox::new();
        mb.request_reload();
        mb.request_reload();
        mb.request_full_invalidate();
        assert_eq!(
            mb.take(),
            Requests {
                reload: true,
                full_invalidate: true
            }
        );
        assert!(mb.take().is_empty());
        assert!(mb.peek().is_empty());
    }

    #[test]
    fn no_request_is_dropped_under_contention() {
        const POSTS: usize = 10_000;
        let mb = Arc::new(RequestMailbox::new());
        let done = Arc::new(AtomicUsize::new(0));

        let poster = {
            let mb = Arc::clone(&mb);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                for _ in 0..POSTS {
                    mb.request_reload();
                }
                done.store(1, Ordering::Release);
            })
        };

        let mut seen = 0usize;
        loop {
            let finished = done.load(Ordering::Acquire) == 1;
            if mb.take().reload {
                seen += 1;
            }
            if finished && mb.peek().is_empty() {
                break;
            }
        }
        poster.join().unwrap();

        // The final post is always observed.
        assert!(seen >= 1);
        assert!(seen <= POSTS);
        assert!(mb.take().is_empty());
    }
}
