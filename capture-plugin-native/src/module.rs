//! Backend module image backed by a shared library.

use std::ffi::CString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::Library;
use parking_lot::Mutex;

use capture_plugin_core::{
    CaptureControlFn, EntryPointName, HookFn, HostCallbacks, ModuleImage, ModuleOpener,
    PluginError, RegisterCallbacksFn,
};

use crate::abi::{RawCaptureControlFn, RawHookFn, RawRegisterCallbacksFn};
use crate::host::{self, HostRegistration};

/// The library plus the host registration the backend may call back into.
///
/// Field order matters: the library is unloaded before the registration it
/// may reference is freed.
struct LoadedLibrary {
    library: Library,
    host: Mutex<Option<HostRegistration>>,
}

/// A capture backend loaded from a shared library.
///
/// Entry point handles returned by the resolvers each hold a reference to
/// the library, so it stays mapped while any handle is alive.
pub struct NativeModule {
    path: PathBuf,
    inner: Arc<LoadedLibrary>,
}

impl NativeModule {
    /// Load the shared library at `path`.
    ///
    /// # Safety
    ///
    /// Loading runs the library's initializers, and every entry point it
    /// exports under a `capture_*` name must match the signatures in
    /// `crate::abi`. Only trusted backends may be loaded.
    pub unsafe fn open(path: &Path) -> Result<Self, PluginError> {
        // SAFETY: guaranteed by the caller.
        let library = unsafe { Library::new(path) }.map_err(|e| PluginError::ModuleOpenFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        log::info!("loaded capture plugin library {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            inner: Arc::new(LoadedLibrary {
                library,
                host: Mutex::new(None),
            }),
        })
    }

    /// Whether `register-callbacks` has been invoked on this module.
    pub fn has_host_registration(&self) -> bool {
        self.inner.host.lock().is_some()
    }

    fn symbol<T: Copy>(&self, name: EntryPointName) -> Option<T> {
        // SAFETY: `T` is the function pointer type the ABI declares for `name`,
        // as required by `NativeModule::open`.
        let symbol = unsafe { self.inner.library.get::<T>(name.symbol().as_bytes()) };
        match symbol {
            Ok(symbol) => Some(*symbol),
            Err(e) => {
                log::debug!("{} not exported by {}: {}", name, self.path.display(), e);
                None
            }
        }
    }

    fn hook(&self, name: EntryPointName) -> Option<HookFn> {
        let raw: RawHookFn = self.symbol(name)?;
        let inner = Arc::clone(&self.inner);
        Some(Arc::new(move || {
            let _library: &LoadedLibrary = &inner;
            // SAFETY: the library is kept loaded by `inner`.
            unsafe { raw() }
        }))
    }

    fn control(&self, name: EntryPointName) -> Option<CaptureControlFn> {
        let raw: RawCaptureControlFn = self.symbol(name)?;
        let inner = Arc::clone(&self.inner);
        Some(Arc::new(move |endpoint_key: &str| -> Result<(), PluginError> {
            let _library: &LoadedLibrary = &inner;
            let c_key = CString::new(endpoint_key)
                .map_err(|_| PluginError::InvalidEndpointKey(endpoint_key.to_string()))?;
            // SAFETY: the library is kept loaded by `inner`; `c_key` outlives the call.
            unsafe { raw(c_key.as_ptr()) };
            Ok(())
        }))
    }
}

impl ModuleImage for NativeModule {
    fn path(&self) -> &Path {
        &self.path
    }

    fn register_callbacks(&self) -> Option<RegisterCallbacksFn> {
        let raw: RawRegisterCallbacksFn = self.symbol(EntryPointName::RegisterCallbacks)?;
        let inner = Arc::clone(&self.inner);
        Some(Box::new(move |callbacks: HostCallbacks| {
            let registration = HostRegistration::new(callbacks);
            let handle = registration.handle();
            // Stored first: the backend may call back from inside registration.
            *inner.host.lock() = Some(registration);
            // SAFETY: the library is kept loaded by `inner` and the handle by
            // the registration stored alongside it.
            unsafe { raw(host::deliver_audio, host::deliver_event, handle) };
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

/// Opens backend modules as native shared libraries.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeOpener;

impl ModuleOpener for NativeOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn ModuleImage>, PluginError> {
        // SAFETY: the host only points the plugin directory at trusted backends.
        let module = unsafe { NativeModule::open(path)? };
        Ok(Box::new(module))
    }
}
