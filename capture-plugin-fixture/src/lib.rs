//! Test backend speaking the capture plugin C ABI.
//!
//! Declares its own copy of the ABI types, the way a third-party backend
//! would. Behavior:
//!
//! - `capture_register_callbacks` stores the host callbacks and logs
//!   `"registered"` through the host handle before returning.
//! - `capture_configure` and `capture_initialize` log `"configured"` and
//!   `"initialized"`.
//! - `capture_run` delivers one PCM chunk on endpoint `"run"` and returns.
//! - `capture_start` delivers a start event, a local and a remote chunk on
//!   the given endpoint; `capture_stop` delivers a stop event.

use std::ffi::{c_char, c_void, CStr};
use std::ptr;

use parking_lot::Mutex;

#[repr(C)]
pub struct AudioChunk {
    pub payload: *const u8,
    pub payload_len: usize,
    pub timestamp_ms: u64,
    pub sequence_number: u32,
    pub sample_rate: u32,
    pub format: u32,
}

#[repr(C)]
pub struct CaptureEvent {
    pub kind: u32,
    pub timestamp_ms: u64,
    pub key: *const c_char,
    pub value: *const c_char,
}

#[repr(C)]
pub struct HostHandle {
    pub log: unsafe extern "C" fn(*const HostHandle, u32, *const c_char),
    pub context: *const c_void,
}

pub type AudioCallback =
    unsafe extern "C" fn(*const HostHandle, *const AudioChunk, *const c_char, bool);
pub type EventCallback = unsafe extern "C" fn(*const HostHandle, *const CaptureEvent, *const c_char);

const FORMAT_PCM16: u32 = 1;
const EVENT_START: u32 = 1;
const EVENT_STOP: u32 = 2;
const LEVEL_INFO: u32 = 3;

#[derive(Clone, Copy)]
struct Host {
    audio: AudioCallback,
    event: EventCallback,
    handle: *const HostHandle,
}

// SAFETY: the handle is only dereferenced by the host, which guarantees it
// stays valid and thread-safe while registered.
unsafe impl Send for Host {}

static HOST: Mutex<Option<Host>> = Mutex::new(None);
static SEQUENCE: Mutex<u32> = Mutex::new(0);

fn host() -> Option<Host> {
    *HOST.lock()
}

fn log(host: &Host, message: &CStr) {
    // SAFETY: `handle` was registered by the host and is still live.
    unsafe { ((*host.handle).log)(host.handle, LEVEL_INFO, message.as_ptr()) };
}

fn emit_audio(host: &Host, endpoint_key: *const c_char, remote: bool) {
    let payload = [0x10u8, 0x00, 0x20, 0x00];
    let sequence_number = {
        let mut sequence = SEQUENCE.lock();
        *sequence += 1;
        *sequence
    };
    let chunk = AudioChunk {
        payload: payload.as_ptr(),
        payload_len: payload.len(),
        timestamp_ms: 1_000,
        sequence_number,
        sample_rate: 8_000,
        format: FORMAT_PCM16,
    };
    // SAFETY: callback and handle come from registration; the chunk outlives the call.
    unsafe { (host.audio)(host.handle, &chunk, endpoint_key, remote) };
}

fn emit_event(host: &Host, kind: u32, endpoint_key: *const c_char) {
    let event = CaptureEvent {
        kind,
        timestamp_ms: 1_000,
        key: ptr::null(),
        value: ptr::null(),
    };
    // SAFETY: callback and handle come from registration; the event outlives the call.
    unsafe { (host.event)(host.handle, &event, endpoint_key) };
}

/// # Safety
///
/// `host` must stay valid until the library is unloaded.
#[no_mangle]
pub unsafe extern "C" fn capture_register_callbacks(
    audio: AudioCallback,
    event: EventCallback,
    host: *const HostHandle,
) {
    let registered = Host {
        audio,
        event,
        handle: host,
    };
    *HOST.lock() = Some(registered);
    log(&registered, c"registered");
}

#[no_mangle]
pub extern "C" fn capture_configure() {
    if let Some(host) = host() {
        log(&host, c"configured");
    }
}

#[no_mangle]
pub extern "C" fn capture_initialize() {
    if let Some(host) = host() {
        log(&host, c"initialized");
    }
}

#[no_mangle]
pub extern "C" fn capture_run() {
    if let Some(host) = host() {
        emit_audio(&host, c"run".as_ptr(), false);
    }
}

/// # Safety
///
/// `endpoint_key` must be a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn capture_start(endpoint_key: *const c_char) {
    if let Some(host) = host() {
        emit_event(&host, EVENT_START, endpoint_key);
        emit_audio(&host, endpoint_key, false);
        emit_audio(&host, endpoint_key, true);
    }
}

/// # Safety
///
/// `endpoint_key` must be a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn capture_stop(endpoint_key: *const c_char) {
    if let Some(host) = host() {
        emit_event(&host, EVENT_STOP, endpoint_key);
    }
}
