//! Host side of the C callback interface.
//!
//! The `extern "C"` trampolines here are what the backend actually calls.
//! They decode the raw arguments, copy anything borrowed, and forward to the
//! registered `CaptureSink`. Panics are caught at the boundary and logged.

use std::borrow::Cow;
use std::ffi::{c_char, c_void, CStr};
use std::panic::{self, AssertUnwindSafe};
use std::slice;
use std::sync::Arc;

use capture_plugin_core::traits::backend_log::level_from_code;
use capture_plugin_core::{AudioChunk, AudioFormat, CaptureEvent, EventKind, HostCallbacks};

use crate::abi::{HostHandle, RawAudioChunk, RawCaptureEvent};

/// Keeps a `HostHandle` and the callbacks it points to alive for as long as
/// the backend may use them.
pub struct HostRegistration {
    handle: Box<HostHandle>,
    _callbacks: Box<HostCallbacks>,
}

// SAFETY: `handle.context` points into `_callbacks`, which is owned by this
// struct and only ever read through shared references. `HostCallbacks` is
// itself Send + Sync.
unsafe impl Send for HostRegistration {}
unsafe impl Sync for HostRegistration {}

impl HostRegistration {
    pub fn new(callbacks: HostCallbacks) -> Self {
        let callbacks = Box::new(callbacks);
        let context = &*callbacks as *const HostCallbacks as *const c_void;
        Self {
            handle: Box::new(HostHandle {
                log: host_log,
                context,
            }),
            _callbacks: callbacks,
        }
    }

    /// Pointer handed to the backend. Stable for the registration's lifetime.
    pub fn handle(&self) -> *const HostHandle {
        &*self.handle
    }
}

/// # Safety
///
/// `host` must be null or a handle obtained from a live `HostRegistration`.
unsafe fn callbacks<'a>(host: *const HostHandle) -> Option<&'a HostCallbacks> {
    // SAFETY: guaranteed by the caller.
    let handle = unsafe { host.as_ref()? };
    // SAFETY: `context` was set from a `Box<HostCallbacks>` owned by the registration.
    unsafe { (handle.context as *const HostCallbacks).as_ref() }
}

/// # Safety
///
/// `ptr` must be null or a valid NUL-terminated string.
unsafe fn string_from_ptr<'a>(ptr: *const c_char) -> Option<Cow<'a, str>> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: non-null and NUL-terminated per the ABI.
    Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy())
}

fn guarded(callback: &str, f: impl FnOnce()) {
    if panic::catch_unwind(AssertUnwindSafe(f)).is_err() {
        log::error!("panic in {} callback, backend call returned early", callback);
    }
}

/// Copy a raw chunk into an owned `AudioChunk`.
///
/// # Safety
///
/// `raw.payload` must be null or point to `raw.payload_len` readable bytes.
pub unsafe fn audio_chunk_from_raw(raw: &RawAudioChunk) -> AudioChunk {
    let payload = if raw.payload.is_null() || raw.payload_len == 0 {
        Vec::new()
    } else {
        // SAFETY: guaranteed by the caller.
        unsafe { slice::from_raw_parts(raw.payload, raw.payload_len) }.to_vec()
    };
    AudioChunk::new(AudioFormat::from_code(raw.format), raw.timestamp_ms, payload)
        .with_sequence_number(raw.sequence_number)
        .with_sample_rate(raw.sample_rate)
}

/// Copy a raw event into an owned `CaptureEvent`.
///
/// # Safety
///
/// `raw.key` and `raw.value` must each be null or a valid NUL-terminated string.
pub unsafe fn capture_event_from_raw(raw: &RawCaptureEvent) -> CaptureEvent {
    // SAFETY: guaranteed by the caller.
    let (key, value) = unsafe { (string_from_ptr(raw.key), string_from_ptr(raw.value)) };
    CaptureEvent::new(EventKind::from_code(raw.kind), raw.timestamp_ms).with_key_value(
        key.map(Cow::into_owned).unwrap_or_default(),
        value.map(Cow::into_owned).unwrap_or_default(),
    )
}

/// Audio callback registered with the backend.
///
/// # Safety
///
/// Arguments must follow the ABI described in `crate::abi`.
pub unsafe extern "C" fn deliver_audio(
    host: *const HostHandle,
    chunk: *const RawAudioChunk,
    endpoint_key: *const c_char,
    remote: bool,
) {
    guarded("audio", || {
        // SAFETY: the backend passes back the handle it was registered with.
        let Some(callbacks) = (unsafe { callbacks(host) }) else {
            log::error!("audio callback without host handle, chunk dropped");
            return;
        };
        // SAFETY: pointers are null or valid per the ABI.
        let (raw, key) = unsafe { (chunk.as_ref(), string_from_ptr(endpoint_key)) };
        let (Some(raw), Some(key)) = (raw, key) else {
            log::error!("audio callback with null chunk or endpoint key, chunk dropped");
            return;
        };
        // SAFETY: payload validity is part of the ABI.
        let chunk = unsafe { audio_chunk_from_raw(raw) };
        callbacks.sink.deliver_audio(Arc::new(chunk), &key, remote);
    });
}

/// Event callback registered with the backend.
///
/// # Safety
///
/// Arguments must follow the ABI described in `crate::abi`.
pub unsafe extern "C" fn deliver_event(
    host: *const HostHandle,
    event: *const RawCaptureEvent,
    endpoint_key: *const c_char,
) {
    guarded("event", || {
        // SAFETY: the backend passes back the handle it was registered with.
        let Some(callbacks) = (unsafe { callbacks(host) }) else {
            log::error!("event callback without host handle, event dropped");
            return;
        };
        // SAFETY: pointers are null or valid per the ABI.
        let (raw, key) = unsafe { (event.as_ref(), string_from_ptr(endpoint_key)) };
        let (Some(raw), Some(key)) = (raw, key) else {
            log::error!("event callback with null event or endpoint key, event dropped");
            return;
        };
        // SAFETY: string validity is part of the ABI.
        let event = unsafe { capture_event_from_raw(raw) };
        callbacks.sink.deliver_event(Arc::new(event), &key);
    });
}

/// Logger entry point stored in every `HostHandle`.
///
/// # Safety
///
/// Arguments must follow the ABI described in `crate::abi`.
pub unsafe extern "C" fn host_log(host: *const HostHandle, level: u32, message: *const c_char) {
    guarded("log", || {
        // SAFETY: the backend passes back the handle it was registered with.
        let (callbacks, message) = unsafe { (callbacks(host), string_from_ptr(message)) };
        if let (Some(callbacks), Some(message)) = (callbacks, message) {
            callbacks.logger.log(level_from_code(level), &message);
        }
    });
}
