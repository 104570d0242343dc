//! JSON file settings backend
//!
//! Every setting lives in one JSON object. Writes go to a sibling
//! temporary file that is then renamed over the original, so a crash
//! mid-write leaves the previous contents intact.

use crate::constants::SETTINGS_TEMP_SUFFIX;
use crate::error_ext::ErrorContext;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;
use vmkit_domain::error::{Error, Result};
use vmkit_domain::ports::settings::SettingsBackend;

/// Settings backend persisting to a JSON file
///
/// The file and its parent directory are created on first write. A missing
/// file reads as empty.
#[derive(Debug)]
pub struct JsonFileSettingsBackend {
    path: PathBuf,
    // Serializes read-modify-write cycles within the process
    lock: Mutex<()>,
}

impl JsonFileSettingsBackend {
    /// Create a backend for `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Settings file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Map<String, Value>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => {
                return Err(Error::io_with_source(
                    format!("Failed to read settings file {}", self.path.display()),
                    err,
                ));
            }
        };
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&content)
            .serialization_context(format!("Settings file {} is not valid JSON", self.path.display()))?
        {
            Value::Object(map) => Ok(map),
            _ => Err(Error::serialization(format!(
                "Settings file {} does not contain a JSON object",
                self.path.display()
            ))),
        }
    }

    async fn write_all(&self, values: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .io_context(format!("Failed to create {}", parent.display()))?;
            }
        }

        let content = serde_json::to_string_pretty(values)
            .serialization_context("Failed to serialize settings")?;
        let temp = self.path.with_extension(SETTINGS_TEMP_SUFFIX);
        tokio::fs::write(&temp, content)
            .await
            .io_context(format!("Failed to write {}", temp.display()))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .io_context(format!("Failed to replace {}", self.path.display()))?;

        debug!(path = %self.path.display(), entries = values.len(), "Settings written");
        Ok(())
    }
}

#[async_trait]
impl SettingsBackend for JsonFileSettingsBackend {
    fn backend_name(&self) -> &str {
        "file"
    }

    async fn load(&self, key: &str) -> Result<Option<Value>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.remove(key))
    }

    async fn save(&self, key: &str, value: Value) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut values = self.read_all().await?;
        values.insert(key.to_string(), value);
        self.write_all(&values).await
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut values = self.read_all().await?;
        if values.remove(key).is_none() {
            return Ok(false);
        }
        self.write_all(&values).await?;
        Ok(true)
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let _guard = self.lock.lock().await;
        let mut keys: Vec<String> = self.read_all().await?.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
