use thiserror::Error;

/// Errors raised while activating a capture backend or driving it afterwards.
///
/// Load-time variants are reported by `CapturePluginProxy::initialize` and are
/// never fatal to the host by themselves; `PluginNotLoaded` is the caller-facing
/// error for control calls made outside the `Loaded` state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PluginError {
    #[error("capture plugin directory could not be found: {0}")]
    DirectoryNotFound(String),

    #[error("failed to load capture plugin {path}: {reason}")]
    ModuleOpenFailed { path: String, reason: String },

    #[error("could not find {name} entry point in {path}")]
    MissingEntryPoint { name: &'static str, path: String },

    #[error("failed to find any capture plugin in: {0}")]
    NoCandidateFound(String),

    #[error("{0}: capture plugin not yet loaded")]
    PluginNotLoaded(&'static str),

    #[error("capture plugin proxy was already activated")]
    AlreadyActivated,

    #[error("invalid endpoint key: {0:?}")]
    InvalidEndpointKey(String),

    #[error("invalid plugin configuration: {0}")]
    InvalidConfiguration(String),
}

impl PluginError {
    /// Whether this error was produced while activating a module, i.e. the
    /// proxy ends up in `LoadFailed` with it.
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            Self::DirectoryNotFound(_)
                | Self::ModuleOpenFailed { .. }
                | Self::MissingEntryPoint { .. }
                | Self::NoCandidateFound(_)
                | Self::InvalidConfiguration(_)
        )
    }
}
