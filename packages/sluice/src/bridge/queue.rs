// minimal core of the bridge. the exposed API is a convenience wrapper
// around this.

use super::{
    event::Event,
    host::{HostRuntime, Released},
};
use std::sync::{
    atomic::{AtomicUsize, Ordering::Relaxed},
    Arc, Condvar, Mutex,
};

// handle to the shared half of the bridge.
pub(crate) struct Queue(Arc<Shared>);

// bridge shared state.
struct Shared {
    // mutex around the insertion list. the only piece of the bridge that
    // producers ever touch.
    inbox: Mutex<Inbox>,
    // signalled after every push and on close.
    wake: Condvar,
    // events pushed and not yet handed out, across both the insertion list
    // and the consumer's ready list.
    pending: AtomicUsize,
}

// lockable state: the LIFO insertion list.
struct Inbox {
    // most recently pushed node. following `next` walks backwards in time.
    head: Option<Box<Node>>,
    // set once by close, never cleared.
    closed: bool,
}

// singly linked node. owned by exactly one place at a time: the pushing
// thread (briefly), the insertion list, or the consumer's ready list.
struct Node {
    event: Event,
    next: Option<Box<Node>>,
}

// consumer-owned FIFO of drained nodes, oldest at the head. no lock guards
// this; the single-consumer invariant is enforced by Ready living inside the
// non-Clone consumer handle.
#[derive(Default)]
pub(crate) struct Ready {
    head: Option<Box<Node>>,
}

// outcome of a non-blocking drain.
pub(crate) enum TryDrain {
    // at least one node moved onto the ready list.
    Drained,
    // nothing buffered; the bridge is still open.
    Empty,
    // nothing buffered and the bridge is closed.
    Closed,
}

impl Queue {
    // construct an empty, open queue.
    pub(crate) fn new() -> Self {
        Queue(Arc::new(Shared {
            inbox: Mutex::new(Inbox { head: None, closed: false }),
            wake: Condvar::new(),
            pending: AtomicUsize::new(0),
        }))
    }

    // clone another handle to the queue.
    pub(crate) fn clone(&self) -> Self {
        Queue(Arc::clone(&self.0))
    }

    // number of undelivered events. exact on the consumer thread, advisory
    // anywhere else.
    pub(crate) fn pending(&self) -> usize {
        self.0.pending.load(Relaxed)
    }

    // link an event at the head of the insertion list and wake the consumer.
    // O(1) under the lock; callable from any thread; never blocks beyond the
    // brief mutex hold. events arriving after close are dropped.
    pub(crate) fn push(&self, event: Event) {
        let mut inbox = self.0.inbox.lock().unwrap();
        if inbox.closed {
            drop(inbox);
            debug!(request_id = event.request_id, "event pushed after close, dropping");
            return;
        }
        inbox.head = Some(Box::new(Node { event, next: inbox.head.take() }));
        self.0.pending.fetch_add(1, Relaxed);
        drop(inbox);
        // signal outside the lock so the consumer wakes into an uncontended
        // mutex.
        self.0.wake.notify_one();
    }

    // set the closed flag and wake the consumer out of its wait. buffered
    // events remain deliverable.
    pub(crate) fn close(&self) {
        let mut inbox = self.0.inbox.lock().unwrap();
        if !inbox.closed {
            inbox.closed = true;
            debug!("bridge closed");
        }
        drop(inbox);
        self.0.wake.notify_all();
    }

    // consumer only, and only when `ready` is empty: block until the
    // insertion list is non-empty or the bridge is closed, then move every
    // node onto `ready`. returns false iff closed and fully drained.
    //
    // the reversal runs while the lock is held. producers stall for that
    // O(k) window; the alternative of unlocking first would let a racing
    // push interleave ahead of already-drained events, so any change here
    // must re-verify the single-consumer ownership of `ready`.
    //
    // the host's execution lock is handed back for the duration of the wait
    // only, never around the list manipulation. that is sound because
    // nothing on the push path touches host-owned state.
    pub(crate) fn drain_into(&self, ready: &mut Ready, host: &dyn HostRuntime) -> bool {
        debug_assert!(ready.head.is_none());
        let mut inbox = self.0.inbox.lock().unwrap();
        if inbox.head.is_none() && !inbox.closed {
            // the sole blocking point in the bridge.
            let token = Released::new(host);
            while inbox.head.is_none() && !inbox.closed {
                inbox = self.0.wake.wait(inbox).unwrap();
            }
            // reacquire before anything host-owned can be touched again
            drop(token);
        }
        if inbox.head.is_none() {
            return false;
        }
        let count = reverse_onto(&mut inbox, ready);
        trace!(count, "drained insertion list");
        true
    }

    // consumer only. non-blocking variant of drain_into.
    pub(crate) fn try_drain_into(&self, ready: &mut Ready) -> TryDrain {
        debug_assert!(ready.head.is_none());
        let mut inbox = self.0.inbox.lock().unwrap();
        if inbox.head.is_none() {
            return if inbox.closed { TryDrain::Closed } else { TryDrain::Empty };
        }
        let count = reverse_onto(&mut inbox, ready);
        trace!(count, "drained insertion list");
        TryDrain::Drained
    }

    // account for one event handed to the caller.
    pub(crate) fn note_delivered(&self) {
        self.0.pending.fetch_sub(1, Relaxed);
    }
}

// pop every node off the LIFO insertion head and push it onto the ready
// head, which leaves `ready` in chronological arrival order. runs under the
// inbox lock.
fn reverse_onto(inbox: &mut Inbox, ready: &mut Ready) -> usize {
    let mut count = 0;
    while let Some(mut node) = inbox.head.take() {
        inbox.head = node.next.take();
        node.next = ready.head.take();
        ready.head = Some(node);
        count += 1;
    }
    count
}

impl Ready {
    // whether anything is buffered consumer-side.
    pub(crate) fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    // pop in arrival order. no lock; the single consumer owns this list.
    pub(crate) fn pop(&mut self) -> Option<Event> {
        let mut node = self.head.take()?;
        self.head = node.next.take();
        Some(node.event)
    }
}

// dropping a long chain node-by-recursive-node would overflow the stack on a
// large backlog, so both list owners unlink iteratively.

impl Drop for Inbox {
    fn drop(&mut self) {
        let mut next = self.head.take();
        while let Some(mut node) = next {
            next = node.next.take();
        }
    }
}

impl Drop for Ready {
    fn drop(&mut self) {
        let mut next = self.head.take();
        while let Some(mut node) = next {
            next = node.next.take();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{event::ResponseKind, host::Unhosted};
    use bytes::Bytes;

    fn event(request_id: u32) -> Event {
        Event {
            request_id,
            payload: Bytes::new(),
            kind: ResponseKind::Success,
            finished: false,
        }
    }

    fn drain(queue: &Queue, ready: &mut Ready) -> bool {
        queue.drain_into(ready, &Unhosted)
    }

    #[test]
    fn drain_reverses_insertion_order() {
        let queue = Queue::new();
        for id in 1..=5 {
            queue.push(event(id));
        }
        let mut ready = Ready::default();
        assert!(drain(&queue, &mut ready));
        for id in 1..=5 {
            assert_eq!(ready.pop().unwrap().request_id, id);
        }
        assert!(ready.pop().is_none());
    }

    #[test]
    fn second_drain_sees_only_new_events() {
        let queue = Queue::new();
        queue.push(event(1));
        let mut ready = Ready::default();
        assert!(drain(&queue, &mut ready));
        assert_eq!(ready.pop().unwrap().request_id, 1);

        queue.push(event(2));
        queue.push(event(3));
        assert!(drain(&queue, &mut ready));
        assert_eq!(ready.pop().unwrap().request_id, 2);
        assert_eq!(ready.pop().unwrap().request_id, 3);
        assert!(ready.pop().is_none());
    }

    #[test]
    fn pending_tracks_undelivered_events() {
        let queue = Queue::new();
        assert_eq!(queue.pending(), 0);
        queue.push(event(1));
        queue.push(event(2));
        assert_eq!(queue.pending(), 2);

        let mut ready = Ready::default();
        assert!(drain(&queue, &mut ready));
        // draining moves events between lists without delivering them
        assert_eq!(queue.pending(), 2);
        ready.pop().unwrap();
        queue.note_delivered();
        assert_eq!(queue.pending(), 1);
        ready.pop().unwrap();
        queue.note_delivered();
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn closed_and_empty_drain_returns_false() {
        let queue = Queue::new();
        queue.close();
        let mut ready = Ready::default();
        assert!(!drain(&queue, &mut ready));
    }

    #[test]
    fn close_does_not_discard_buffered_events() {
        let queue = Queue::new();
        queue.push(event(7));
        queue.close();
        let mut ready = Ready::default();
        assert!(drain(&queue, &mut ready));
        assert_eq!(ready.pop().unwrap().request_id, 7);
        assert!(!drain(&queue, &mut ready));
    }

    #[test]
    fn push_after_close_is_dropped() {
        let queue = Queue::new();
        queue.close();
        queue.push(event(1));
        assert_eq!(queue.pending(), 0);
        let mut ready = Ready::default();
        assert!(!drain(&queue, &mut ready));
    }

    #[test]
    fn long_backlog_drops_without_recursing() {
        let queue = Queue::new();
        for id in 0..200_000 {
            queue.push(event(id));
        }
        // dropping the queue with the backlog still linked must not blow the
        // stack
        drop(queue);
    }
}
