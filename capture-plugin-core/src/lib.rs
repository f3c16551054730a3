//! # capture-plugin-core
//!
//! Platform-agnostic host side of the capture backend plugin interface.
//!
//! Discovers the backend module, binds its entry points in a fixed order,
//! gates control calls on successful activation, and routes the audio and
//! events the backend pushes back into a lazily populated endpoint registry.
//! The native shared-library loader (`capture-plugin-native`) implements the
//! `ModuleOpener` trait and plugs into the generic `CapturePluginProxy`.
//!
//! ## Architecture
//!
//! ```text
//! capture-plugin-core (this crate)
//! ├── models/       ← AudioChunk, CaptureEvent, PluginConfig, PluginError, ActivationState
//! ├── traits/       ← CaptureSink, CaptureEndpoint, ModuleImage, ConfigRegistrar, BackendLog
//! ├── plugin/       ← module discovery, ABI binder, CapturePluginProxy
//! ├── router/       ← CallbackRouter (backend → endpoint data path)
//! ├── registry/     ← EndpointRegistry (get-or-create by key)
//! ├── endpoint/     ← CapturePort, the default buffering endpoint
//! └── processing/   ← RingBuffer
//! ```
//!
//! ## Composition
//!
//! ```ignore
//! let registry = Arc::new(EndpointRegistry::with_capture_ports(config.endpoint_buffer_capacity));
//! let router = Arc::new(CallbackRouter::new(registry, config.filter_mode()));
//! let callbacks = HostCallbacks { sink: router.clone(), logger: Arc::new(LogFacade) };
//! let mut proxy = CapturePluginProxy::new(config, NativeOpener, callbacks, Arc::new(ConfigureHooks::new()));
//! proxy.initialize()?;
//! ```

pub mod endpoint;
pub mod models;
pub mod plugin;
pub mod processing;
pub mod registry;
pub mod router;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use endpoint::port::{BufferedChunk, CapturePort, CapturePortFactory, PortDiagnostics};
pub use models::audio_chunk::{AudioChunk, AudioFormat};
pub use models::capture_event::{CaptureEvent, EventKind};
pub use models::config::{FilterMode, PluginConfig};
pub use models::error::PluginError;
pub use models::state::ActivationState;
pub use plugin::binder::BoundEntryPoints;
pub use plugin::discovery::locate_module;
pub use plugin::proxy::CapturePluginProxy;
pub use processing::ring_buffer::RingBuffer;
pub use registry::endpoint_registry::EndpointRegistry;
pub use router::callback_router::{CallbackRouter, RouterDiagnostics};
pub use traits::backend_log::{BackendLog, LogFacade};
pub use traits::capture_endpoint::{CaptureEndpoint, EndpointFactory};
pub use traits::capture_sink::CaptureSink;
pub use traits::config_registrar::{ConfigRegistrar, ConfigureHooks};
pub use traits::module_image::{
    CaptureControlFn, EntryPointName, HookFn, HostCallbacks, ModuleImage, ModuleOpener,
    RegisterCallbacksFn,
};
