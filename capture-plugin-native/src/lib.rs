//! # capture-plugin-native
//!
//! Native shared-library backend loader for capture-plugin-core.
//!
//! Provides:
//! - `NativeOpener` — `ModuleOpener` that loads backends with `libloading`
//! - `NativeModule` — `ModuleImage` resolving the `capture_*` entry points
//! - `abi` — `#[repr(C)]` types and function signatures shared with backends
//! - `host` — `extern "C"` trampolines the backend calls into
//!
//! ## Usage
//! ```ignore
//! use capture_plugin_core::CapturePluginProxy;
//! use capture_plugin_native::NativeOpener;
//!
//! let mut proxy = CapturePluginProxy::new(config, NativeOpener, callbacks, registrar);
//! proxy.initialize()?;
//! ```

pub mod abi;
pub mod host;
pub mod module;

pub use host::HostRegistration;
pub use module::{NativeModule, NativeOpener};
