use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::models::audio_chunk::AudioChunk;
use crate::models::capture_event::CaptureEvent;
use crate::processing::ring_buffer::RingBuffer;
use crate::traits::capture_endpoint::{CaptureEndpoint, EndpointFactory};

/// Per-port counters, for debugging capture sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortDiagnostics {
    pub local_chunks: u64,
    pub remote_chunks: u64,
    pub payload_bytes: u64,
    pub events: u64,
    pub dropped_chunks: u64,
    pub dropped_events: u64,
}

/// A chunk as buffered by a port, tagged with the side it came from.
#[derive(Debug, Clone)]
pub struct BufferedChunk {
    pub chunk: Arc<AudioChunk>,
    pub remote: bool,
}

struct PortState {
    audio: RingBuffer<BufferedChunk>,
    events: RingBuffer<Arc<CaptureEvent>>,
    diagnostics: PortDiagnostics,
    last_activity: DateTime<Utc>,
}

/// Default endpoint: buffers audio and events for one call until an external
/// consumer drains them.
///
/// Buffers are bounded and drop the oldest entries on overflow. Processing
/// of the buffered data (VAD, segmentation, recording) happens elsewhere.
pub struct CapturePort {
    id: Uuid,
    key: String,
    created_at: DateTime<Utc>,
    state: Mutex<PortState>,
}

impl CapturePort {
    pub fn new(key: impl Into<String>, capacity: usize) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            key: key.into(),
            created_at: now,
            state: Mutex::new(PortState {
                audio: RingBuffer::new(capacity),
                events: RingBuffer::new(capacity),
                diagnostics: PortDiagnostics::default(),
                last_activity: now,
            }),
        }
    }

    /// Unique instance id, distinguishing ports that reuse a key over time.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.state.lock().last_activity
    }

    /// Time since the last chunk or event, as seen at `now`.
    pub fn idle_for(&self, now: DateTime<Utc>) -> Duration {
        now - self.last_activity()
    }

    pub fn diagnostics(&self) -> PortDiagnostics {
        let s = self.state.lock();
        let mut diagnostics = s.diagnostics.clone();
        diagnostics.dropped_chunks = s.audio.dropped();
        diagnostics.dropped_events = s.events.dropped();
        diagnostics
    }

    pub fn pending_audio(&self) -> usize {
        self.state.lock().audio.count()
    }

    pub fn pending_events(&self) -> usize {
        self.state.lock().events.count()
    }

    /// Remove up to `max` buffered chunks, oldest first.
    pub fn drain_audio(&self, max: usize) -> Vec<BufferedChunk> {
        self.state.lock().audio.drain(max)
    }

    /// Remove up to `max` buffered events, oldest first.
    pub fn drain_events(&self, max: usize) -> Vec<Arc<CaptureEvent>> {
        self.state.lock().events.drain(max)
    }
}

impl CaptureEndpoint for CapturePort {
    fn key(&self) -> &str {
        &self.key
    }

    fn add_audio_chunk(&self, chunk: Arc<AudioChunk>, remote: bool) {
        let mut s = self.state.lock();
        if remote {
            s.diagnostics.remote_chunks += 1;
        } else {
            s.diagnostics.local_chunks += 1;
        }
        s.diagnostics.payload_bytes += chunk.len() as u64;
        s.last_activity = Utc::now();
        s.audio.push(BufferedChunk { chunk, remote });
    }

    fn add_capture_event(&self, event: Arc<CaptureEvent>) {
        let mut s = self.state.lock();
        s.diagnostics.events += 1;
        s.last_activity = Utc::now();
        s.events.push(event);
    }
}

/// Creates `CapturePort`s with a fixed buffer capacity.
#[derive(Debug, Clone, Copy)]
pub struct CapturePortFactory {
    capacity: usize,
}

impl CapturePortFactory {
    /// A zero capacity is raised to one item.
    pub fn new(capacity: usize) -> Self {
        if capacity == 0 {
            log::warn!("endpoint buffer capacity must be positive, using 1");
        }
        Self {
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl EndpointFactory<CapturePort> for CapturePortFactory {
    fn create(&self, key: &str) -> Arc<CapturePort> {
        Arc::new(CapturePort::new(key, self.capacity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::audio_chunk::AudioFormat;
    use crate::models::capture_event::EventKind;

    fn chunk(bytes: usize) -> Arc<AudioChunk> {
        Arc::new(AudioChunk::new(AudioFormat::Ulaw, 0, vec![0xff; bytes]))
    }

    #[test]
    fn counts_local_and_remote_audio() {
        let port = CapturePort::new("port-1", 8);
        port.add_audio_chunk(chunk(160), false);
        port.add_audio_chunk(chunk(160), true);
        port.add_audio_chunk(chunk(80), true);

        let d = port.diagnostics();
        assert_eq!(d.local_chunks, 1);
        assert_eq!(d.remote_chunks, 2);
        assert_eq!(d.payload_bytes, 400);
        assert_eq!(port.pending_audio(), 3);

        let drained = port.drain_audio(2);
        assert!(!drained[0].remote);
        assert!(drained[1].remote);
        assert_eq!(port.pending_audio(), 1);
    }

    #[test]
    fn overflow_is_reported_in_diagnostics() {
        let port = CapturePort::new("port-2", 2);
        for _ in 0..5 {
            port.add_capture_event(Arc::new(CaptureEvent::new(EventKind::Update, 0)));
        }
        let d = port.diagnostics();
        assert_eq!(d.events, 5);
        assert_eq!(d.dropped_events, 3);
        assert_eq!(port.drain_events(10).len(), 2);
    }

    #[test]
    fn activity_updates_idle_time() {
        let port = CapturePort::new("port-3", 4);
        let before = port.last_activity();
        port.add_audio_chunk(chunk(1), false);
        assert!(port.last_activity() >= before);

        let later = port.last_activity() + Duration::seconds(30);
        assert_eq!(port.idle_for(later), Duration::seconds(30));
    }

    #[test]
    fn factory_creates_port_with_key() {
        let factory = CapturePortFactory::new(4);
        let endpoint = factory.create("trunk-9");
        assert_eq!(endpoint.key(), "trunk-9");
    }

    #[test]
    fn factory_raises_zero_capacity() {
        let factory = CapturePortFactory::new(0);
        assert_eq!(factory.capacity(), 1);

        let port = factory.create("trunk-1");
        port.add_audio_chunk(chunk(1), false);
        port.add_audio_chunk(chunk(2), false);
        assert_eq!(port.pending_audio(), 1);
        assert_eq!(port.diagnostics().dropped_chunks, 1);
    }
}
