use super::error::PluginError;

/// Activation state of a `CapturePluginProxy`.
///
/// State transitions:
/// ```text
/// unloaded → loaded → released
///     ↓
/// load_failed
/// ```
/// Transitions are one-way; a proxy is never re-activated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActivationState {
    #[default]
    Unloaded,
    Loaded,
    LoadFailed(PluginError),
    Released,
}

impl ActivationState {
    pub fn is_unloaded(&self) -> bool {
        matches!(self, Self::Unloaded)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::LoadFailed(_))
    }

    /// Whether no further transition can leave this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::LoadFailed(_) | Self::Released)
    }

    /// The error that caused activation to fail, if any.
    pub fn failure(&self) -> Option<&PluginError> {
        match self {
            Self::LoadFailed(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unloaded() {
        let state = ActivationState::default();
        assert!(state.is_unloaded());
        assert!(!state.is_terminal());
    }

    #[test]
    fn load_failed_carries_error() {
        let state = ActivationState::LoadFailed(PluginError::NoCandidateFound("plugins/".into()));
        assert!(state.is_failed());
        assert!(state.is_terminal());
        assert_eq!(
            state.failure(),
            Some(&PluginError::NoCandidateFound("plugins/".into()))
        );
    }

    #[test]
    fn loaded_is_not_terminal() {
        assert!(ActivationState::Loaded.is_loaded());
        assert!(!ActivationState::Loaded.is_terminal());
        assert!(ActivationState::Released.is_terminal());
    }
}
