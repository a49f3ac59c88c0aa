// exposed API of the bridge.

use super::{
    error::*,
    queue::{Queue, Ready, TryDrain},
};
use bytes::Bytes;

pub use super::{
    event::{Event, ResponseKind},
    host::{HostRuntime, Unhosted},
};

/// Create an event bridge for a consumer with no host execution lock
///
/// Shorthand for [`bridge_hosted`] with [`Unhosted`].
pub fn bridge() -> (Producer, Consumer) {
    bridge_hosted(Unhosted)
}

/// Create an event bridge
///
/// Returns the producer handle to hand to the native client library as its
/// response callback, and the unique consumer handle for the host runtime's
/// own thread. Whenever the consumer has to block, it brackets the wait, and
/// only the wait, with `host.release()` / `host.acquire()`.
pub fn bridge_hosted(host: impl HostRuntime + 'static) -> (Producer, Consumer) {
    let queue = Queue::new();
    let consumer = Consumer {
        queue: queue.clone(),
        ready: Ready::default(),
        host: Box::new(host),
    };
    (Producer(queue), consumer)
}

/// Producer handle: the native library's side of the bridge
///
/// Cheap to clone; every clone feeds the same queue. Safe to call from any
/// thread, reentrantly, with no ordering relationship between callers, from
/// bridge creation until [`close`](Self::close).
pub struct Producer(Queue);

impl Producer {
    /// Deliver one response from the native library
    ///
    /// Copies `payload` byte for byte before returning; the library is free
    /// to reclaim or overwrite its buffer the moment this call returns.
    /// Never blocks beyond the queue's brief mutex hold, and never touches
    /// host-managed state. Raw kinds above 4 are clamped to 5 on arrival.
    /// Events delivered after the bridge is closed are dropped.
    pub fn on_event(&self, request_id: u32, payload: &[u8], response_kind: u32, finished: bool) {
        self.0.push(Event {
            request_id,
            payload: Bytes::copy_from_slice(payload),
            kind: ResponseKind::from_raw(response_kind),
            finished,
        });
    }

    /// Close the bridge
    ///
    /// Wakes a consumer blocked in [`Consumer::next`]. Already-buffered
    /// events are still delivered; further `on_event` calls are dropped.
    /// Idempotent.
    pub fn close(&self) {
        self.0.close();
    }
}

impl Clone for Producer {
    fn clone(&self) -> Self {
        Producer(self.0.clone())
    }
}

/// Consumer handle: the host runtime's side of the bridge
///
/// Exactly one exists per bridge. It is not `Clone`, and the FIFO of drained
/// events lives inside it, which is what lets [`next`](Self::next) pop
/// without taking any lock.
pub struct Consumer {
    queue: Queue,
    ready: Ready,
    host: Box<dyn HostRuntime>,
}

impl Consumer {
    /// Whether any event is buffered and undelivered
    ///
    /// Non-blocking peek with no side effects, covering both the shared
    /// insertion list and the consumer's own drained list.
    pub fn has_pending(&self) -> bool {
        self.queue.pending() > 0
    }

    /// Fetch the next event in arrival order, blocking if none is buffered
    ///
    /// Delivery is chronological per producer thread; across producer
    /// threads it is the order in which their pushes won the queue lock.
    /// Blocks only when both lists are empty, releasing the host's execution
    /// lock for exactly the duration of the wait. Returns `None` once the
    /// bridge is closed and every buffered event has been delivered.
    pub fn next(&mut self) -> Option<Event> {
        if self.ready.is_empty() && !self.queue.drain_into(&mut self.ready, self.host.as_ref()) {
            return None;
        }
        let event = self.ready.pop()?;
        self.queue.note_delivered();
        Some(event)
    }

    /// Fetch the next event only if one is already buffered
    pub fn try_next(&mut self) -> Result<Event, TryNextError> {
        if self.ready.is_empty() {
            match self.queue.try_drain_into(&mut self.ready) {
                TryDrain::Drained => (),
                TryDrain::Empty => return Err(WouldBlockError.into()),
                TryDrain::Closed => return Err(ClosedError.into()),
            }
        }
        match self.ready.pop() {
            Some(event) => {
                self.queue.note_delivered();
                Ok(event)
            }
            None => Err(WouldBlockError.into()),
        }
    }

    /// Close the bridge from the consumer side
    ///
    /// Equivalent to [`Producer::close`].
    pub fn close(&self) {
        self.queue.close();
    }
}

/// Blocking iteration over delivered events, ending when the bridge is
/// closed and drained
impl Iterator for Consumer {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        Consumer::next(self)
    }
}


// ==== tests ====
