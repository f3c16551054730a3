//! C ABI shared with backend modules.
//!
//! A backend is a shared library exporting the six `capture_*` symbols below
//! with the C calling convention. The host registers two callbacks and a
//! `HostHandle`; the backend passes the handle back as the first argument of
//! every callback and of `HostHandle::log`.
//!
//! Strings are NUL-terminated UTF-8 (decoded lossily) and only need to stay
//! valid for the duration of the call that receives them. Payload bytes are
//! copied by the host before the callback returns.

use std::ffi::{c_char, c_void};

/// Audio chunk as delivered by the backend.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawAudioChunk {
    pub payload: *const u8,
    pub payload_len: usize,
    pub timestamp_ms: u64,
    pub sequence_number: u32,
    pub sample_rate: u32,
    /// `AudioFormat` code.
    pub format: u32,
}

/// Capture event as delivered by the backend.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawCaptureEvent {
    /// `EventKind` code.
    pub kind: u32,
    pub timestamp_ms: u64,
    /// Nullable.
    pub key: *const c_char,
    /// Nullable.
    pub value: *const c_char,
}

/// Logger handle given to the backend at registration.
///
/// `context` is opaque to the backend.
#[repr(C)]
pub struct HostHandle {
    pub log: RawLogFn,
    pub context: *const c_void,
}

/// Log through the host. `level`: 1 = error, 2 = warn, 3 = info, 4 = debug, 5 = trace.
pub type RawLogFn = unsafe extern "C" fn(host: *const HostHandle, level: u32, message: *const c_char);

pub type RawAudioCallback = unsafe extern "C" fn(
    host: *const HostHandle,
    chunk: *const RawAudioChunk,
    endpoint_key: *const c_char,
    remote: bool,
);

pub type RawEventCallback = unsafe extern "C" fn(
    host: *const HostHandle,
    event: *const RawCaptureEvent,
    endpoint_key: *const c_char,
);

/// `capture_register_callbacks`
pub type RawRegisterCallbacksFn =
    unsafe extern "C" fn(audio: RawAudioCallback, event: RawEventCallback, host: *const HostHandle);

/// `capture_configure`, `capture_initialize`, `capture_run`
pub type RawHookFn = unsafe extern "C" fn();

/// `capture_start`, `capture_stop`
pub type RawCaptureControlFn = unsafe extern "C" fn(endpoint_key: *const c_char);
