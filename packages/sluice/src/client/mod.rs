// pass-through surface over the native client library.
//
// nothing here touches the queue except by handing a producer handle to the
// backend's `request`; everything else is direct delegation, with the JSON
// payloads carried opaquely in both directions.

use crate::Producer;
use std::sync::Arc;

#[cfg(feature = "tonclient")]
pub mod tonclient;

/// The native client library, as seen by the bridge
///
/// All output of [`request`](Self::request) arrives asynchronously through
/// the `events` producer handle, from whatever threads the library owns.
/// Failures are represented inside the JSON strings the library produces and
/// pass through this crate unexamined.
pub trait Backend: Send + Sync {
    /// Create a client context from a JSON config
    ///
    /// Synchronous; the library's JSON response (success or failure alike)
    /// is returned unchanged.
    fn create_context(&self, config_json: &str) -> String;

    /// Destroy a client context. No response.
    fn destroy_context(&self, context: u32);

    /// Dispatch a request whose responses arrive through `events`
    ///
    /// The backend may invoke `events` any number of times, from any thread,
    /// until it delivers an event with `finished` set for `request_id`.
    fn request(&self, context: u32, function: &str, params_json: &str, request_id: u32, events: Producer);

    /// Dispatch a request and wait for its response
    ///
    /// Fully synchronous; never touches the event bridge.
    fn request_sync(&self, context: u32, function: &str, params_json: &str) -> String;
}

/// A backend coupled with the producer half of a bridge
pub struct Client {
    backend: Arc<dyn Backend>,
    events: Producer,
}

impl Client {
    /// Couple `backend` with the producer half of a bridge
    ///
    /// The matching [`Consumer`](crate::Consumer) receives everything the
    /// backend delivers for requests dispatched through this client.
    pub fn new(backend: Arc<dyn Backend>, events: Producer) -> Self {
        Client { backend, events }
    }

    /// Pass-through to [`Backend::create_context`]
    pub fn create_context(&self, config_json: &str) -> String {
        self.backend.create_context(config_json)
    }

    /// Pass-through to [`Backend::destroy_context`]
    pub fn destroy_context(&self, context: u32) {
        self.backend.destroy_context(context);
    }

    /// Dispatch `function` on `context`, answered through the bridge
    pub fn request(&self, context: u32, function: &str, params_json: &str, request_id: u32) {
        trace!(request_id, function, "dispatching request");
        self.backend.request(context, function, params_json, request_id, self.events.clone());
    }

    /// Pass-through to [`Backend::request_sync`]
    pub fn request_sync(&self, context: u32, function: &str, params_json: &str) -> String {
        self.backend.request_sync(context, function, params_json)
    }
}
