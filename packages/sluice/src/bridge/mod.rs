// implementation of the event bridge.
//
// the basic architecture is as such:
//
// producer and consumer handles wrap around Arc<shared state>
//                                                 |
//          /--------------------------------------/
//          v
//       shared state
//          |
//          |------ a Mutex around the LIFO insertion list: a singly linked
//          |       list of boxed nodes, newest at the head. producers only
//          |       ever touch the bridge through this lock, O(1) per push.
//          |
//          |------ a Condvar signalled after every push and on close. the
//          |       consumer's wait on it is the sole blocking point in the
//          |       whole crate.
//          |
//          \------ a relaxed atomic count of undelivered events, so the
//                  consumer can answer has_pending without locking.
//
// the FIFO consumption list deliberately does NOT live in the shared state:
// it is a field of the non-Clone consumer handle, so the type system
// enforces that exactly one thread walks it, and popping from it needs no
// lock.
//
// when the consumption list runs dry, the consumer drains the insertion list
// in one batch, reversing it (newest-first -> arrival order) while still
// holding the mutex. producers stall for that O(k) window; in exchange the
// lock is never taken per-pop and is otherwise only ever held for O(1)
// pushes.
//
// the organization of these modules is as such:
//
//      event<--------------queue: the core. owns the lists, the lock and
//                   |      ^      condvar discipline, and the protocol for
//      host<--------|------/      handing the host runtime's execution lock
//                   |             back around the blocking wait.
//                   |
//      error<---------------api: wrapper around queue that adapts it into
//                                the exposed producer/consumer handle API.
//                                the crate re-exports this publically.

pub(crate) mod api;
pub(crate) mod error;

mod event;
mod host;
mod queue;
