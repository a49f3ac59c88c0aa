//! Bindings to the TON client library (`tc_` C ABI), the native backend this
//! bridge was written around.
//!
//! The library invokes its response handler from worker threads it owns, and
//! the handler is a bare function pointer with no user-data argument, so the
//! producer handle for the trampoline lives in a process-wide slot installed
//! once, at [`TonClient::install`] time.

use super::Backend;
use crate::Producer;
use once_cell::sync::OnceCell;
use std::{os::raw::c_char, slice};
use thiserror::Error;

/// Borrowed string view in the library's ABI
#[repr(C)]
#[derive(Copy, Clone)]
struct StringData {
    content: *const c_char,
    len: u32,
}

// opaque library-owned string; read with tc_read_string, freed with
// tc_destroy_string.
#[repr(C)]
struct StringHandle {
    _private: [u8; 0],
}

type ResponseHandler =
    extern "C" fn(request_id: u32, params_json: StringData, response_type: u32, finished: bool);

#[link(name = "ton_client")]
extern "C" {
    fn tc_create_context(config: StringData) -> *const StringHandle;
    fn tc_destroy_context(context: u32);
    fn tc_request(
        context: u32,
        function_name: StringData,
        function_params_json: StringData,
        request_id: u32,
        response_handler: ResponseHandler,
    );
    fn tc_request_sync(
        context: u32,
        function_name: StringData,
        function_params_json: StringData,
    ) -> *const StringHandle;
    fn tc_read_string(handle: *const StringHandle) -> StringData;
    fn tc_destroy_string(handle: *const StringHandle);
}

static EVENTS: OnceCell<Producer> = OnceCell::new();

extern "C" fn response_handler(
    request_id: u32,
    params_json: StringData,
    response_type: u32,
    finished: bool,
) {
    // the library reclaims params_json the moment we return; on_event copies
    // it first.
    if let Some(events) = EVENTS.get() {
        let payload = unsafe { as_bytes(params_json) };
        events.on_event(request_id, payload, response_type, finished);
    }
}

// view of a borrowed library string. caller asserts `data` outlives the
// returned slice.
unsafe fn as_bytes<'a>(data: StringData) -> &'a [u8] {
    if data.content.is_null() || data.len == 0 {
        &[]
    } else {
        slice::from_raw_parts(data.content as *const u8, data.len as usize)
    }
}

fn as_data(s: &str) -> StringData {
    StringData { content: s.as_ptr() as *const c_char, len: s.len() as u32 }
}

// copy a library-owned string handle out and free it.
unsafe fn take_string(handle: *const StringHandle) -> String {
    let data = tc_read_string(handle);
    let json = String::from_utf8_lossy(as_bytes(data)).into_owned();
    tc_destroy_string(handle);
    json
}

/// Error for installing a second bridge into the per-process callback slot
#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
#[error("a producer is already installed for the tonclient callback")]
pub struct InstallError;

/// The real TON client library
///
/// Responses to [`request`](Backend::request) arrive through the bridge whose
/// producer was installed; the C ABI carries no user data in its callback, so
/// there is exactly one such bridge per process.
pub struct TonClient(());

impl TonClient {
    /// Install `events` as the library's response sink and get the backend
    ///
    /// Errors if called a second time: the callback slot cannot be replaced
    /// once worker threads may already be delivering into it.
    pub fn install(events: Producer) -> Result<TonClient, InstallError> {
        EVENTS.set(events).map_err(|_| InstallError)?;
        debug!("tonclient response sink installed");
        Ok(TonClient(()))
    }
}

impl Backend for TonClient {
    fn create_context(&self, config_json: &str) -> String {
        unsafe { take_string(tc_create_context(as_data(config_json))) }
    }

    fn destroy_context(&self, context: u32) {
        unsafe { tc_destroy_context(context) }
    }

    fn request(&self, context: u32, function: &str, params_json: &str, request_id: u32, _events: Producer) {
        // the trampoline feeds the producer installed at construction, which
        // is the same bridge as `_events` by construction.
        unsafe {
            tc_request(
                context,
                as_data(function),
                as_data(params_json),
                request_id,
                response_handler,
            )
        }
    }

    fn request_sync(&self, context: u32, function: &str, params_json: &str) -> String {
        unsafe {
            take_string(tc_request_sync(context, as_data(function), as_data(params_json)))
        }
    }
}
