//! Resolves and activates a module's entry points.
//!
//! Binding order is fixed: register-callbacks, configure, initialize, run,
//! start-capture, stop-capture. Register-callbacks is invoked immediately and
//! is optional. Configure is handed to the configuration system and
//! initialize is invoked as soon as it resolves. Every other entry point is
//! stored. Binding stops at the first missing required entry point.

use std::fmt;

use crate::models::error::PluginError;
use crate::traits::config_registrar::ConfigRegistrar;
use crate::traits::module_image::{
    CaptureControlFn, EntryPointName, HookFn, HostCallbacks, ModuleImage,
};

/// Entry points retained after a successful activation. Immutable.
#[derive(Clone)]
pub struct BoundEntryPoints {
    pub run: HookFn,
    pub start_capture: CaptureControlFn,
    pub stop_capture: CaptureControlFn,
    /// Whether the module exported register-callbacks.
    pub callbacks_registered: bool,
}

impl fmt::Debug for BoundEntryPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundEntryPoints")
            .field("callbacks_registered", &self.callbacks_registered)
            .finish_non_exhaustive()
    }
}

/// Bind `image`, registering `callbacks` with it and its configure entry
/// point with `registrar`.
pub fn bind(
    image: &dyn ModuleImage,
    callbacks: HostCallbacks,
    registrar: &dyn ConfigRegistrar,
) -> Result<BoundEntryPoints, PluginError> {
    let callbacks_registered = match image.register_callbacks() {
        Some(register) => {
            register(callbacks);
            true
        }
        None => {
            log::warn!(
                "could not find {} entry point in {}, backend callbacks not registered",
                EntryPointName::RegisterCallbacks,
                image.path().display()
            );
            false
        }
    };

    let configure = require(image, EntryPointName::Configure, image.configure())?;
    registrar.add_configure_function(configure);

    let initialize = require(image, EntryPointName::Initialize, image.initialize())?;
    initialize();

    let run = require(image, EntryPointName::Run, image.run())?;
    let start_capture = require(image, EntryPointName::StartCapture, image.start_capture())?;
    let stop_capture = require(image, EntryPointName::StopCapture, image.stop_capture())?;

    log::info!("capture plugin {} activated", image.path().display());
    Ok(BoundEntryPoints {
        run,
        start_capture,
        stop_capture,
        callbacks_registered,
    })
}

fn require<T>(
    image: &dyn ModuleImage,
    name: EntryPointName,
    resolved: Option<T>,
) -> Result<T, PluginError> {
    resolved.ok_or_else(|| {
        let path = image.path().display().to_string();
        log::error!("could not find {} entry point in {}", name, path);
        PluginError::MissingEntryPoint {
            name: name.symbol(),
            path,
        }
    })
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted module images for binder and proxy tests.

    use std::collections::HashSet;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use parking_lot::Mutex;

    use crate::models::error::PluginError;
    use crate::traits::capture_sink::CaptureSink;
    use crate::traits::module_image::{
        CaptureControlFn, EntryPointName, HookFn, HostCallbacks, ModuleImage, ModuleOpener,
        RegisterCallbacksFn,
    };

    /// What happened to a fake module, in order.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Probe {
        Resolved(EntryPointName),
        Invoked(EntryPointName),
        Control(EntryPointName, String),
    }

    #[derive(Default)]
    pub struct Journal {
        pub probes: Mutex<Vec<Probe>>,
        pub sink: Mutex<Option<Arc<dyn CaptureSink>>>,
    }

    impl Journal {
        pub fn probes(&self) -> Vec<Probe> {
            self.probes.lock().clone()
        }

        pub fn resolved(&self) -> Vec<EntryPointName> {
            self.probes()
                .into_iter()
                .filter_map(|p| match p {
                    Probe::Resolved(name) => Some(name),
                    _ => None,
                })
                .collect()
        }

        fn record(&self, probe: Probe) {
            self.probes.lock().push(probe);
        }
    }

    pub struct FakeModule {
        pub path: PathBuf,
        pub missing: HashSet<EntryPointName>,
        pub journal: Arc<Journal>,
    }

    impl FakeModule {
        pub fn complete() -> Self {
            Self {
                path: PathBuf::from("/plugins/libfake.so"),
                missing: HashSet::new(),
                journal: Arc::new(Journal::default()),
            }
        }

        pub fn without(mut self, name: EntryPointName) -> Self {
            self.missing.insert(name);
            self
        }

        fn resolve(&self, name: EntryPointName) -> bool {
            self.journal.record(Probe::Resolved(name));
            !self.missing.contains(&name)
        }

        fn hook(&self, name: EntryPointName) -> Option<HookFn> {
            if !self.resolve(name) {
                return None;
            }
            let journal = Arc::clone(&self.journal);
            Some(Arc::new(move || journal.record(Probe::Invoked(name))))
        }

        fn control(&self, name: EntryPointName) -> Option<CaptureControlFn> {
            if !self.resolve(name) {
                return None;
            }
            let journal = Arc::clone(&self.journal);
            Some(Arc::new(move |key: &str| -> Result<(), PluginError> {
                journal.record(Probe::Control(name, key.to_string()));
                Ok(())
            }))
        }
    }

    impl ModuleImage for FakeModule {
        fn path(&self) -> &Path {
            &self.path
        }

        fn register_callbacks(&self) -> Option<RegisterCallbacksFn> {
            if !self.resolve(EntryPointName::RegisterCallbacks) {
                return None;
            }
            let journal = Arc::clone(&self.journal);
            Some(Box::new(move |callbacks: HostCallbacks| {
                journal.record(Probe::Invoked(EntryPointName::RegisterCallbacks));
                *journal.sink.lock() = Some(callbacks.sink);
            }))
        }

        fn configure(&self) -> Option<HookFn> {
            self.hook(EntryPointName::Configure)
        }

        fn initialize(&self) -> Option<HookFn> {
            self.hook(EntryPointName::Initialize)
        }

        fn run(&self) -> Option<HookFn> {
            self.hook(EntryPointName::Run)
        }

        fn start_capture(&self) -> Option<CaptureControlFn> {
            self.control(EntryPointName::StartCapture)
        }

        fn stop_capture(&self) -> Option<CaptureControlFn> {
            self.control(EntryPointName::StopCapture)
        }
    }

    /// Opener handing out one scripted module, or failing.
    pub struct FakeOpener {
        pub module: Mutex<Option<FakeModule>>,
        pub opened: Mutex<Vec<PathBuf>>,
    }

    impl FakeOpener {
        pub fn new(module: FakeModule) -> Self {
            Self {
                module: Mutex::new(Some(module)),
                opened: Mutex::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            Self {
                module: Mutex::new(None),
                opened: Mutex::new(Vec::new()),
            }
        }
    }

    impl ModuleOpener for FakeOpener {
        fn open(&self, path: &Path) -> Result<Box<dyn ModuleImage>, PluginError> {
            self.opened.lock().push(path.to_path_buf());
            match self.module.lock().take() {
                Some(mut module) => {
                    module.path = path.to_path_buf();
                    Ok(Box::new(module))
                }
                None => Err(PluginError::ModuleOpenFailed {
                    path: path.display().to_string(),
                    reason: "not a shared library".into(),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::testing::{FakeModule, Probe};
    use super::*;
    use crate::models::config::FilterMode;
    use crate::registry::endpoint_registry::EndpointRegistry;
    use crate::router::callback_router::CallbackRouter;
    use crate::traits::backend_log::LogFacade;
    use crate::traits::config_registrar::ConfigureHooks;

    fn callbacks() -> HostCallbacks {
        let registry = Arc::new(EndpointRegistry::with_capture_ports(4));
        HostCallbacks {
            sink: Arc::new(CallbackRouter::new(registry, FilterMode::default())),
            logger: Arc::new(LogFacade),
        }
    }

    #[test]
    fn complete_module_binds_in_order() {
        let module = FakeModule::complete();
        let journal = Arc::clone(&module.journal);
        let hooks = ConfigureHooks::new();

        let bound = bind(&module, callbacks(), &hooks).unwrap();

        assert!(bound.callbacks_registered);
        assert_eq!(journal.resolved(), EntryPointName::BINDING_ORDER.to_vec());
        assert_eq!(
            journal.probes(),
            vec![
                Probe::Resolved(EntryPointName::RegisterCallbacks),
                Probe::Invoked(EntryPointName::RegisterCallbacks),
                Probe::Resolved(EntryPointName::Configure),
                Probe::Resolved(EntryPointName::Initialize),
                Probe::Invoked(EntryPointName::Initialize),
                Probe::Resolved(EntryPointName::Run),
                Probe::Resolved(EntryPointName::StartCapture),
                Probe::Resolved(EntryPointName::StopCapture),
            ]
        );
        assert!(journal.sink.lock().is_some());
        // Configure is registered, not invoked.
        assert_eq!(hooks.len(), 1);
    }

    #[test]
    fn missing_register_callbacks_still_binds() {
        let module = FakeModule::complete().without(EntryPointName::RegisterCallbacks);
        let journal = Arc::clone(&module.journal);

        let bound = bind(&module, callbacks(), &ConfigureHooks::new()).unwrap();

        assert!(!bound.callbacks_registered);
        assert_eq!(journal.resolved().len(), 6);
        assert!(journal.sink.lock().is_none());
    }

    #[test]
    fn each_missing_required_entry_point_stops_binding() {
        let required = &EntryPointName::BINDING_ORDER[1..];
        for (index, missing) in required.iter().enumerate() {
            let module = FakeModule::complete().without(*missing);
            let journal = Arc::clone(&module.journal);

            let err = bind(&module, callbacks(), &ConfigureHooks::new()).unwrap_err();

            assert_eq!(
                err,
                PluginError::MissingEntryPoint {
                    name: missing.symbol(),
                    path: "/plugins/libfake.so".into(),
                }
            );
            // Nothing past the failing entry point is probed.
            let probed = journal.resolved();
            assert_eq!(probed.len(), index + 2);
            assert_eq!(probed.last(), Some(missing));
        }
    }

    #[test]
    fn missing_initialize_leaves_configure_registered() {
        let module = FakeModule::complete().without(EntryPointName::Initialize);
        let hooks = ConfigureHooks::new();

        assert!(bind(&module, callbacks(), &hooks).is_err());
        assert_eq!(hooks.len(), 1);
    }

    #[test]
    fn missing_configure_skips_initialize() {
        let module = FakeModule::complete().without(EntryPointName::Configure);
        let journal = Arc::clone(&module.journal);
        let hooks = ConfigureHooks::new();

        assert!(bind(&module, callbacks(), &hooks).is_err());
        assert!(hooks.is_empty());
        assert!(!journal
            .probes()
            .contains(&Probe::Invoked(EntryPointName::Initialize)));
    }
}
