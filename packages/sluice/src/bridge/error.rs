// bridge error types.

use thiserror::Error;

/// Error for fetching from a bridge that is closed and fully drained
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Error)]
#[error("bridge closed")]
pub struct ClosedError;

/// Error for a non-blocking fetch that found no buffered event
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Error)]
#[error("operation would block")]
pub struct WouldBlockError;

/// Error for trying to fetch an event without blocking
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Error)]
pub enum TryNextError {
    /// The bridge is closed and every buffered event has been delivered
    #[error(transparent)]
    Closed(#[from] ClosedError),
    /// No event is buffered right now
    #[error(transparent)]
    WouldBlock(#[from] WouldBlockError),
}
