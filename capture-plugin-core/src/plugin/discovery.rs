//! Locates the backend module file.
//!
//! A configured module name is used as-is under the plugin directory. Otherwise
//! the directory is scanned and the first entry carrying the module extension
//! wins, in whatever order the directory listing yields. The scan is not
//! sorted, so with several candidates present the choice is unspecified.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::config::PluginConfig;
use crate::models::error::PluginError;

/// Resolve the module path described by `config`.
pub fn locate_module(config: &PluginConfig) -> Result<PathBuf, PluginError> {
    let directory = config.plugin_directory();
    match config.configured_name() {
        Some(name) => Ok(directory.join(name)),
        None => scan_directory(directory, &config.module_extension),
    }
}

/// Return the first entry of `directory` whose extension is `extension`.
pub fn scan_directory(directory: &Path, extension: &str) -> Result<PathBuf, PluginError> {
    let entries = fs::read_dir(directory).map_err(|e| {
        log::error!(
            "capture plugin directory could not be found: {} ({})",
            directory.display(),
            e
        );
        PluginError::DirectoryNotFound(directory.display().to_string())
    })?;

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("skipping unreadable entry in {}: {}", directory.display(), e);
                continue;
            }
        };
        let path = entry.path();
        if is_module_file(&path, extension) {
            log::info!("selected capture plugin {}", path.display());
            return Ok(path);
        }
    }

    log::error!(
        "failed to find any capture plugin in: {}",
        directory.display()
    );
    Err(PluginError::NoCandidateFound(directory.display().to_string()))
}

fn is_module_file(path: &Path, extension: &str) -> bool {
    path.extension() == Some(OsStr::new(extension))
}
