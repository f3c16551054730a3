use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::models::audio_chunk::AudioChunk;
use crate::models::capture_event::CaptureEvent;
use crate::models::config::FilterMode;
use crate::registry::endpoint_registry::EndpointRegistry;
use crate::traits::capture_endpoint::CaptureEndpoint;
use crate::traits::capture_sink::CaptureSink;

/// Log target for per-endpoint diagnostics.
pub const PORT_LOG_TARGET: &str = "capture_plugin::port";

/// Routing counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterDiagnostics {
    pub audio_chunks_routed: u64,
    pub events_routed: u64,
    pub framing_events_dropped: u64,
}

#[derive(Default)]
struct Counters {
    audio_chunks_routed: AtomicU64,
    events_routed: AtomicU64,
    framing_events_dropped: AtomicU64,
}

/// Routes backend callbacks to endpoints.
///
/// Audio is always forwarded. Events are forwarded unless a filtering mode is
/// active and the event is start/stop framing, in which case it is dropped
/// and logged: under VAD or segmentation the host derives framing itself.
pub struct CallbackRouter<E: ?Sized = dyn CaptureEndpoint> {
    registry: Arc<EndpointRegistry<E>>,
    filter_mode: FilterMode,
    counters: Counters,
}

impl<E: CaptureEndpoint + ?Sized> CallbackRouter<E> {
    pub fn new(registry: Arc<EndpointRegistry<E>>, filter_mode: FilterMode) -> Self {
        Self {
            registry,
            filter_mode,
            counters: Counters::default(),
        }
    }

    pub fn registry(&self) -> &Arc<EndpointRegistry<E>> {
        &self.registry
    }

    pub fn filter_mode(&self) -> FilterMode {
        self.filter_mode
    }

    pub fn diagnostics(&self) -> RouterDiagnostics {
        RouterDiagnostics {
            audio_chunks_routed: self.counters.audio_chunks_routed.load(Ordering::Relaxed),
            events_routed: self.counters.events_routed.load(Ordering::Relaxed),
            framing_events_dropped: self.counters.framing_events_dropped.load(Ordering::Relaxed),
        }
    }
}

impl<E: CaptureEndpoint + ?Sized> CaptureSink for CallbackRouter<E> {
    fn deliver_audio(&self, chunk: Arc<AudioChunk>, endpoint_key: &str, remote: bool) {
        let endpoint = self.registry.get_or_create(endpoint_key);
        endpoint.add_audio_chunk(chunk, remote);
        self.counters.audio_chunks_routed.fetch_add(1, Ordering::Relaxed);
    }

    fn deliver_event(&self, event: Arc<CaptureEvent>, endpoint_key: &str) {
        if self.filter_mode.is_active() && event.kind.is_framing() {
            log::error!(
                target: PORT_LOG_TARGET,
                "#{}: received start or stop while in VAD or audio segmentation mode",
                endpoint_key
            );
            self.counters.framing_events_dropped.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let endpoint = self.registry.get_or_create(endpoint_key);
        endpoint.add_capture_event(event);
        self.counters.events_routed.fetch_add(1, Ordering::Relaxed);
    }
}
