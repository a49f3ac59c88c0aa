// leaf data type delivered through the bridge.

use bytes::Bytes;

/// One response delivered by the native client library
///
/// Ownership moves wholly along the delivery path: the callback copies the
/// library's transient buffer into `payload`, the queue owns the event while
/// it is buffered, and the caller of [`Consumer::next`](crate::Consumer::next)
/// owns it afterwards. No two threads ever hold the same event.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Event {
    /// The request this event answers, as passed to the native library
    pub request_id: u32,
    /// JSON payload, carried opaquely and never interpreted by the bridge
    pub payload: Bytes,
    /// Category of the event
    pub kind: ResponseKind,
    /// Whether the native library considers the request complete
    pub finished: bool,
}

/// Category of a delivered event
///
/// The native library is free to introduce kinds above
/// [`AppNotify`](Self::AppNotify); the bridge rewrites those to
/// [`Other`](Self::Other) on arrival, so consumers only ever see this closed
/// set of six values.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(u32)]
pub enum ResponseKind {
    /// Successful result of a request
    Success = 0,
    /// A request failed; the payload carries the library's error JSON
    Error = 1,
    /// No payload; reports request processing state
    Nop = 2,
    /// A request addressed to application code
    AppRequest = 3,
    /// A notification addressed to application code
    AppNotify = 4,
    /// Any kind above the known range
    Other = 5,
}

impl ResponseKind {
    /// Convert a raw kind from the native library, clamping unknown values
    ///
    /// Anything above 4 collapses to `Other` (= 5). This is a forward
    /// compatibility shim, not validation; the clamp boundary is fixed.
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => ResponseKind::Success,
            1 => ResponseKind::Error,
            2 => ResponseKind::Nop,
            3 => ResponseKind::AppRequest,
            4 => ResponseKind::AppNotify,
            _ => ResponseKind::Other,
        }
    }

    /// The raw representation, always in `0..=5`
    pub fn as_raw(self) -> u32 {
        self as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_kinds_round_trip() {
        for raw in 0..=5 {
            assert_eq!(ResponseKind::from_raw(raw).as_raw(), raw);
        }
    }

    #[test]
    fn unknown_kinds_clamp_to_other() {
        assert_eq!(ResponseKind::from_raw(6), ResponseKind::Other);
        assert_eq!(ResponseKind::from_raw(7), ResponseKind::Other);
        assert_eq!(ResponseKind::from_raw(u32::MAX), ResponseKind::Other);
        assert_eq!(ResponseKind::from_raw(7).as_raw(), 5);
    }

    #[test]
    fn boundary_kind_is_not_clamped() {
        assert_eq!(ResponseKind::from_raw(4), ResponseKind::AppNotify);
        assert_eq!(ResponseKind::from_raw(4).as_raw(), 4);
    }
}
