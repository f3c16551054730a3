use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::models::error::PluginError;

use super::backend_log::BackendLog;
use super::capture_sink::CaptureSink;

/// A no-argument backend entry point (`configure`, `initialize`, `run`).
pub type HookFn = Arc<dyn Fn() + Send + Sync>;

/// A backend entry point taking an endpoint key (`start-capture`, `stop-capture`).
///
/// Fails only when the key cannot be handed to the backend.
pub type CaptureControlFn = Arc<dyn Fn(&str) -> Result<(), PluginError> + Send + Sync>;

/// The `register-callbacks` entry point, consumed by its single invocation.
pub type RegisterCallbacksFn = Box<dyn FnOnce(HostCallbacks) + Send>;

/// What the host hands to the backend at registration time.
#[derive(Clone)]
pub struct HostCallbacks {
    pub sink: Arc<dyn CaptureSink>,
    pub logger: Arc<dyn BackendLog>,
}

/// The fixed set of entry points a backend module exposes, in binding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryPointName {
    RegisterCallbacks,
    Configure,
    Initialize,
    Run,
    StartCapture,
    StopCapture,
}

impl EntryPointName {
    pub const BINDING_ORDER: [EntryPointName; 6] = [
        Self::RegisterCallbacks,
        Self::Configure,
        Self::Initialize,
        Self::Run,
        Self::StartCapture,
        Self::StopCapture,
    ];

    /// Exported symbol name in the module image.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::RegisterCallbacks => "capture_register_callbacks",
            Self::Configure => "capture_configure",
            Self::Initialize => "capture_initialize",
            Self::Run => "capture_run",
            Self::StartCapture => "capture_start",
            Self::StopCapture => "capture_stop",
        }
    }
}

impl fmt::Display for EntryPointName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A loaded backend image from which entry points are resolved by name.
///
/// Each resolver returns `None` when the module does not export the entry
/// point. Returned handles keep whatever they need from the image alive.
pub trait ModuleImage: Send + Sync {
    /// Path the image was loaded from.
    fn path(&self) -> &Path;

    fn register_callbacks(&self) -> Option<RegisterCallbacksFn>;

    fn configure(&self) -> Option<HookFn>;

    fn initialize(&self) -> Option<HookFn>;

    fn run(&self) -> Option<HookFn>;

    fn start_capture(&self) -> Option<CaptureControlFn>;

    fn stop_capture(&self) -> Option<CaptureControlFn>;
}

/// Opens module files. Implemented by the native shared-library loader.
pub trait ModuleOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn ModuleImage>, PluginError>;
}
