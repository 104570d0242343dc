//! Typed settings service

use crate::config::{SettingsBackendKind, SettingsConfig};
use crate::error_ext::ErrorContext;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::any::type_name;
use std::sync::Arc;
use tracing::debug;
use vmkit_domain::error::{Error, Result};
use vmkit_domain::ports::settings::SettingsBackend;

use super::{InMemorySettingsBackend, JsonFileSettingsBackend};

/// Typed access to persisted settings
///
/// Values are stored as JSON; a missing key yields the caller's default,
/// while a stored value of the wrong shape is an error.
#[derive(Clone)]
pub struct SettingsService {
    backend: Arc<dyn SettingsBackend>,
}

impl SettingsService {
    /// Create a service over `backend`
    pub fn new(backend: Arc<dyn SettingsBackend>) -> Self {
        Self { backend }
    }

    /// Create a service over a fresh in-memory backend
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemorySettingsBackend::new()))
    }

    /// Backend name for diagnostics
    pub fn backend_name(&self) -> &str {
        self.backend.backend_name()
    }

    /// Read `key`, falling back to `default` when it was never set
    pub async fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T> {
        validate_key(key)?;
        match self.backend.load(key).await? {
            Some(value) => serde_json::from_value(value).serialization_context(format!(
                "Setting '{key}' is not a {}",
                type_name::<T>()
            )),
            None => Ok(default),
        }
    }

    /// Read `key` if it was set
    pub async fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        validate_key(key)?;
        self.backend
            .load(key)
            .await?
            .map(|value| {
                serde_json::from_value(value).serialization_context(format!(
                    "Setting '{key}' is not a {}",
                    type_name::<T>()
                ))
            })
            .transpose()
    }

    /// Store `value` under `key`
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        validate_key(key)?;
        let value = serde_json::to_value(value)
            .serialization_context(format!("Failed to serialize setting '{key}'"))?;
        self.backend.save(key, value).await?;
        debug!(key, backend = self.backend.backend_name(), "Setting stored");
        Ok(())
    }

    /// Delete `key`, reporting whether it was set
    pub async fn remove(&self, key: &str) -> Result<bool> {
        validate_key(key)?;
        self.backend.remove(key).await
    }

    /// Whether `key` was set
    pub async fn contains(&self, key: &str) -> Result<bool> {
        validate_key(key)?;
        Ok(self.backend.load(key).await?.is_some())
    }

    /// Every stored key in lexical order
    pub async fn keys(&self) -> Result<Vec<String>> {
        self.backend.keys().await
    }
}

impl std::fmt::Debug for SettingsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsService")
            .field("backend", &self.backend.backend_name())
            .finish()
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::invalid_argument("Setting key cannot be empty"));
    }
    Ok(())
}

/// Build the backend selected by configuration
pub fn backend_from_config(config: &SettingsConfig) -> Arc<dyn SettingsBackend> {
    match config.backend {
        SettingsBackendKind::Memory => Arc::new(InMemorySettingsBackend::new()),
        SettingsBackendKind::File => Arc::new(JsonFileSettingsBackend::new(config.resolved_path())),
    }
}
