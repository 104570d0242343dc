//! Settings storage configuration types

use crate::constants::{DEFAULT_CONFIG_DIR, DEFAULT_SETTINGS_FILENAME};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings backend types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SettingsBackendKind {
    /// Process-local map, lost on exit
    Memory,
    /// JSON file persisted across restarts
    #[default]
    File,
}

/// Settings storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    /// Backend to use
    pub backend: SettingsBackendKind,

    /// Settings file location (file backend only)
    ///
    /// Defaults to `<user config dir>/vmkit/settings.json`.
    pub path: Option<PathBuf>,
}

impl SettingsConfig {
    /// Config for the in-memory backend
    pub fn memory() -> Self {
        Self {
            backend: SettingsBackendKind::Memory,
            path: None,
        }
    }

    /// Config for the file backend at `path`
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: SettingsBackendKind::File,
            path: Some(path.into()),
        }
    }

    /// Effective settings file path
    ///
    /// Falls back to the user config directory, then the working directory.
    pub fn resolved_path(&self) -> PathBuf {
        if let Some(path) = &self.path {
            return path.clone();
        }
        dirs::config_dir()
            .map(|dir| dir.join(DEFAULT_CONFIG_DIR))
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_SETTINGS_FILENAME)
    }
}
