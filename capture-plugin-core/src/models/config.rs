use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::PluginError;

/// Global filtering mode under which the host derives start/stop framing
/// itself, so backend-originated start/stop events are anomalous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterMode {
    pub vad: bool,
    pub audio_segmentation: bool,
}

impl FilterMode {
    pub fn is_active(&self) -> bool {
        self.vad || self.audio_segmentation
    }
}

/// Settings the host hands to the plugin layer.
///
/// Loading these values is the host's business; the struct derives serde so
/// it can sit inside whatever configuration document the host reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    /// Directory holding the backend module(s).
    pub plugin_directory: PathBuf,

    /// Specific module file name inside `plugin_directory`. When absent (or
    /// empty), the first file with `module_extension` is used.
    pub plugin_name: Option<String>,

    /// File extension identifying module files during a directory scan,
    /// without the leading dot (default: the platform library extension).
    pub module_extension: String,

    /// Voice-activity detection is performed by the host.
    pub vad: bool,

    /// Audio segmentation is performed by the host.
    pub audio_segmentation: bool,

    /// Capacity of each endpoint's audio and event buffers (default: 512).
    pub endpoint_buffer_capacity: usize,
}

impl PluginConfig {
    pub fn new(plugin_directory: impl Into<PathBuf>) -> Self {
        Self {
            plugin_directory: plugin_directory.into(),
            ..Self::default()
        }
    }

    pub fn with_plugin_name(mut self, name: impl Into<String>) -> Self {
        self.plugin_name = Some(name.into());
        self
    }

    /// The configured module name, treating an empty string as absent.
    pub fn configured_name(&self) -> Option<&str> {
        self.plugin_name.as_deref().filter(|name| !name.is_empty())
    }

    pub fn plugin_directory(&self) -> &Path {
        &self.plugin_directory
    }

    pub fn filter_mode(&self) -> FilterMode {
        FilterMode {
            vad: self.vad,
            audio_segmentation: self.audio_segmentation,
        }
    }

    /// Check the settings discovery depends on.
    ///
    /// The module extension only matters when the directory is scanned, so a
    /// configured module name skips that check. Directory existence is left to
    /// discovery.
    pub fn validate(&self) -> Result<(), PluginError> {
        if self.configured_name().is_none()
            && (self.module_extension.is_empty() || self.module_extension.starts_with('.'))
        {
            return Err(PluginError::InvalidConfiguration(format!(
                "module extension must be non-empty and given without a dot: {:?}",
                self.module_extension
            )));
        }
        Ok(())
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            plugin_directory: PathBuf::from("plugins"),
            plugin_name: None,
            module_extension: std::env::consts::DLL_EXTENSION.to_string(),
            vad: false,
            audio_segmentation: false,
            endpoint_buffer_capacity: 512,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid_and_unfiltered() {
        let config = PluginConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.filter_mode().is_active());
        assert_eq!(config.module_extension, std::env::consts::DLL_EXTENSION);
    }

    #[test]
    fn empty_name_counts_as_unconfigured() {
        let config = PluginConfig::new("plugins").with_plugin_name("");
        assert_eq!(config.configured_name(), None);
    }

    #[test]
    fn either_mode_activates_filtering() {
        let mut config = PluginConfig::default();
        config.vad = true;
        assert!(config.filter_mode().is_active());

        config.vad = false;
        config.audio_segmentation = true;
        assert!(config.filter_mode().is_active());
    }

    #[test]
    fn rejects_dotted_extension() {
        let mut config = PluginConfig::default();
        config.module_extension = ".so".into();
        assert!(matches!(
            config.validate(),
            Err(PluginError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn configured_name_ignores_extension() {
        let mut config = PluginConfig::new("/opt/capture").with_plugin_name("libfake.so");
        config.module_extension = String::new();
        assert!(config.validate().is_ok());

        config.module_extension = ".so".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn capacity_and_directory_are_not_validated_here() {
        let mut config = PluginConfig::new("");
        config.endpoint_buffer_capacity = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: PluginConfig =
            serde_json::from_str(r#"{"plugin_directory": "/opt/capture", "vad": true}"#).unwrap();
        assert_eq!(config.plugin_directory, PathBuf::from("/opt/capture"));
        assert!(config.vad);
        assert_eq!(config.endpoint_buffer_capacity, 512);
        assert_eq!(config.configured_name(), None);
    }
}
