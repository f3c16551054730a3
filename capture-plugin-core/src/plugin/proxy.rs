use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::config::PluginConfig;
use crate::models::error::PluginError;
use crate::models::state::ActivationState;
use crate::plugin::binder::{self, BoundEntryPoints};
use crate::plugin::discovery;
use crate::traits::config_registrar::ConfigRegistrar;
use crate::traits::module_image::{HookFn, HostCallbacks, ModuleImage, ModuleOpener};

/// Host-side façade over the single active capture backend.
///
/// Owns the loaded module and its bound entry points. Control calls are
/// forwarded only in the `Loaded` state; otherwise they fail with
/// `PluginError::PluginNotLoaded` without touching the backend.
///
/// Typical use: call `initialize` once on the composition thread, move the
/// proxy into an `Arc`, call `run` from a dedicated thread (it blocks for the
/// backend's lifetime) and issue `start_capture`/`stop_capture` from anywhere.
pub struct CapturePluginProxy<O: ModuleOpener> {
    config: PluginConfig,
    opener: O,
    callbacks: HostCallbacks,
    registrar: Arc<dyn ConfigRegistrar>,
    state: ActivationState,
    /// Configure hooks this proxy registered, withdrawn on release.
    configure_hooks: Vec<HookFn>,
    // Declared before `module` so handles are dropped before the image.
    entry_points: Option<BoundEntryPoints>,
    module: Option<Box<dyn ModuleImage>>,
}

impl<O: ModuleOpener> CapturePluginProxy<O> {
    pub fn new(
        config: PluginConfig,
        opener: O,
        callbacks: HostCallbacks,
        registrar: Arc<dyn ConfigRegistrar>,
    ) -> Self {
        Self {
            config,
            opener,
            callbacks,
            registrar,
            state: ActivationState::Unloaded,
            configure_hooks: Vec::new(),
            entry_points: None,
            module: None,
        }
    }

    pub fn state(&self) -> &ActivationState {
        &self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state.is_loaded()
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    /// Path of the module image held by the proxy, if any.
    pub fn module_path(&self) -> Option<&Path> {
        self.module.as_ref().map(|m| m.path())
    }

    /// Locate, open and bind the backend. Transitions: unloaded → loaded or
    /// load_failed.
    ///
    /// Meant to be called once. A second call is rejected with
    /// `AlreadyActivated` and leaves the state untouched.
    pub fn initialize(&mut self) -> Result<(), PluginError> {
        if !self.state.is_unloaded() {
            return Err(PluginError::AlreadyActivated);
        }

        match self.activate() {
            Ok(entry_points) => {
                self.entry_points = Some(entry_points);
                self.state = ActivationState::Loaded;
                Ok(())
            }
            Err(err) => {
                self.state = ActivationState::LoadFailed(err.clone());
                Err(err)
            }
        }
    }

    fn activate(&mut self) -> Result<BoundEntryPoints, PluginError> {
        self.config.validate().map_err(|e| {
            log::error!("{}", e);
            e
        })?;

        let path = discovery::locate_module(&self.config)?;
        let module = self.opener.open(&path).map_err(|e| {
            log::error!("failed to load the following plugin: {} ({})", path.display(), e);
            e
        })?;

        // The image stays with the proxy even if binding fails: the backend
        // may already hold our callbacks.
        let module = self.module.insert(module);
        let registrar = TrackingRegistrar::new(self.registrar.as_ref());
        let bound = binder::bind(&**module, self.callbacks.clone(), &registrar);
        self.configure_hooks = registrar.into_registered();
        bound
    }

    /// Hand the calling thread to the backend. Blocks for the backend's
    /// operating lifetime.
    ///
    /// Requires the `Loaded` state.
    pub fn run(&self) -> Result<(), PluginError> {
        let entry_points = self.bound("Run")?;
        log::info!("running capture plugin");
        (entry_points.run)();
        log::info!("capture plugin run returned");
        Ok(())
    }

    /// Ask the backend to start capturing on `endpoint_key`.
    pub fn start_capture(&self, endpoint_key: &str) -> Result<(), PluginError> {
        let entry_points = self.bound("StartCapture")?;
        log::debug!("#{}: start capture", endpoint_key);
        (entry_points.start_capture)(endpoint_key)
    }

    /// Ask the backend to stop capturing on `endpoint_key`.
    pub fn stop_capture(&self, endpoint_key: &str) -> Result<(), PluginError> {
        let entry_points = self.bound("StopCapture")?;
        log::debug!("#{}: stop capture", endpoint_key);
        (entry_points.stop_capture)(endpoint_key)
    }

    /// Release the entry points and the module image. Transitions: loaded →
    /// released.
    ///
    /// Configure hooks registered during activation are withdrawn from the
    /// registrar so nothing keeps the image alive afterwards.
    pub fn unload(&mut self) -> Result<(), PluginError> {
        if !self.state.is_loaded() {
            return Err(PluginError::PluginNotLoaded("Unload"));
        }
        self.release();
        self.state = ActivationState::Released;
        Ok(())
    }

    fn release(&mut self) {
        for configure in self.configure_hooks.drain(..) {
            self.registrar.remove_configure_function(&configure);
        }
        self.entry_points = None;
        if let Some(module) = self.module.take() {
            log::info!("unloading capture plugin {}", module.path().display());
        }
    }

    fn bound(&self, operation: &'static str) -> Result<&BoundEntryPoints, PluginError> {
        match (&self.state, &self.entry_points) {
            (ActivationState::Loaded, Some(entry_points)) => Ok(entry_points),
            _ => Err(PluginError::PluginNotLoaded(operation)),
        }
    }
}

impl<O: ModuleOpener> Drop for CapturePluginProxy<O> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Forwards to the host registrar and remembers what was added.
struct TrackingRegistrar<'a> {
    inner: &'a dyn ConfigRegistrar,
    registered: Mutex<Vec<HookFn>>,
}

impl<'a> TrackingRegistrar<'a> {
    fn new(inner: &'a dyn ConfigRegistrar) -> Self {
        Self {
            inner,
            registered: Mutex::new(Vec::new()),
        }
    }

    fn into_registered(self) -> Vec<HookFn> {
        self.registered.into_inner()
    }
}

impl ConfigRegistrar for TrackingRegistrar<'_> {
    fn add_configure_function(&self, configure: HookFn) {
        self.registered.lock().push(Arc::clone(&configure));
        self.inner.add_configure_function(configure);
    }

    fn remove_configure_function(&self, configure: &HookFn) {
        self.registered.lock().retain(|hook| !Arc::ptr_eq(hook, configure));
        self.inner.remove_configure_function(configure);
    }
}
