//! Bridge from a callback-driven native client library to a single-threaded
//! host runtime.
//!
//! The native library delivers responses by invoking a callback from
//! whatever worker thread it likes. Host runtimes in the OCaml/Python mold
//! run one thread at a time through their managed heap, under a global
//! cooperative execution lock. This crate sits between the two: an unbounded
//! FIFO event queue fed by [`Producer::on_event`] from any number of
//! threads, drained by exactly one [`Consumer`], with the host's lock handed
//! back around the single place the consumer blocks.
//!
//! ```
//! let (producer, mut consumer) = sluice::bridge();
//! producer.on_event(1, br#"{"ok":true}"#, 0, true);
//! let event = consumer.next().unwrap();
//! assert_eq!(event.request_id, 1);
//! ```
//!
//! The pass-through surface over the native library itself lives in
//! [`client`].

#[macro_use]
extern crate tracing;

pub extern crate bytes;

mod bridge;
pub mod client;

pub use crate::bridge::api::*;

/// Error types
pub mod error {
    pub use crate::bridge::error::*;
}
