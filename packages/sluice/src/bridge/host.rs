// the host runtime's cooperative execution lock.

/// Cooperative execution lock of an embedding host runtime
///
/// Host environments in the OCaml/Python mold require one global lock to be
/// held before any of their managed memory is touched. A consumer thread
/// living inside such a runtime must hand that lock back before parking
/// itself in [`Consumer::next`](crate::Consumer::next), or every other
/// thread of the host starves for the duration of the wait.
///
/// Contract for implementors, not enforceable by the type system: nothing
/// the bridge executes between `release` and `acquire` may touch state owned
/// by the host. That holds for this crate because producers interact solely
/// with the bridge's own mutex and condvar. Re-verify it before wiring in a
/// host whose callback path is less independent.
pub trait HostRuntime: Send + Sync {
    /// Hand the host's execution lock back
    fn release(&self);

    /// Take the host's execution lock again, before touching host state
    fn acquire(&self);
}

/// Host runtime for embeddings with no cooperative lock
///
/// Pure-Rust consumers have nothing to release; both operations are no-ops.
#[derive(Debug, Default, Copy, Clone)]
pub struct Unhosted;

impl HostRuntime for Unhosted {
    fn release(&self) {}

    fn acquire(&self) {}
}

// capability token for the released host lock. construction releases, drop
// reacquires, so a wait that exits via panic still restores the lock.
pub(crate) struct Released<'a> {
    host: &'a dyn HostRuntime,
}

impl<'a> Released<'a> {
    pub(crate) fn new(host: &'a dyn HostRuntime) -> Self {
        host.release();
        Released { host }
    }
}

impl Drop for Released<'_> {
    fn drop(&mut self) {
        self.host.acquire();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering::SeqCst};

    #[derive(Default)]
    struct Counting {
        released: AtomicUsize,
        acquired: AtomicUsize,
    }

    impl HostRuntime for Counting {
        fn release(&self) {
            self.released.fetch_add(1, SeqCst);
        }

        fn acquire(&self) {
            self.acquired.fetch_add(1, SeqCst);
        }
    }

    #[test]
    fn token_balances_release_and_acquire() {
        let host = Counting::default();
        {
            let _token = Released::new(&host);
            assert_eq!(host.released.load(SeqCst), 1);
            assert_eq!(host.acquired.load(SeqCst), 0);
        }
        assert_eq!(host.released.load(SeqCst), 1);
        assert_eq!(host.acquired.load(SeqCst), 1);
    }

    #[test]
    fn token_reacquires_across_panic() {
        let host = Counting::default();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _token = Released::new(&host);
            panic!("wait blew up");
        }));
        assert!(result.is_err());
        assert_eq!(host.released.load(SeqCst), 1);
        assert_eq!(host.acquired.load(SeqCst), 1);
    }
}
