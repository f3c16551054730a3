use std::sync::Arc;

use crate::models::audio_chunk::AudioChunk;
use crate::models::capture_event::CaptureEvent;

/// Inbound data path from the backend into the host.
///
/// Both methods are called synchronously on threads owned by the backend,
/// possibly concurrently with each other and with host control calls.
/// Implementations must not block for long.
pub trait CaptureSink: Send + Sync {
    /// Deliver an audio chunk captured for `endpoint_key`. `remote` is set when
    /// the audio originates from the remote side of the call.
    fn deliver_audio(&self, chunk: Arc<AudioChunk>, endpoint_key: &str, remote: bool);

    /// Deliver a capture event for `endpoint_key`.
    fn deliver_event(&self, event: Arc<CaptureEvent>, endpoint_key: &str);
}
