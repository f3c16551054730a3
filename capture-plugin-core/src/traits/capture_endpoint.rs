use std::sync::Arc;

use crate::models::audio_chunk::AudioChunk;
use crate::models::capture_event::CaptureEvent;

/// Per-call destination for audio and events, identified by its key.
///
/// Endpoints are created lazily by the `EndpointRegistry` and may receive
/// data from several backend threads at once.
pub trait CaptureEndpoint: Send + Sync {
    fn key(&self) -> &str;

    fn add_audio_chunk(&self, chunk: Arc<AudioChunk>, remote: bool);

    fn add_capture_event(&self, event: Arc<CaptureEvent>);
}

/// Creates the endpoint object for a key on first reference.
pub trait EndpointFactory<E: ?Sized>: Send + Sync {
    fn create(&self, key: &str) -> Arc<E>;
}

impl<E, F> EndpointFactory<E> for F
where
    E: ?Sized,
    F: Fn(&str) -> Arc<E> + Send + Sync,
{
    fn create(&self, key: &str) -> Arc<E> {
        self(key)
    }
}
