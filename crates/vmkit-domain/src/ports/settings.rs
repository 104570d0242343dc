//! Settings Backend Port
//!
//! Defines the contract for persistent key-value storage behind the
//! settings service. Values are stored as JSON so the service can offer
//! typed access without the backend knowing the types.

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Settings persistence interface
#[async_trait]
pub trait SettingsBackend: Send + Sync {
    /// Short name used in logs
    fn backend_name(&self) -> &str;

    /// Load the value stored under `key`
    async fn load(&self, key: &str) -> Result<Option<Value>>;

    /// Store `value` under `key`, replacing any previous value
    async fn save(&self, key: &str, value: Value) -> Result<()>;

    /// Delete `key`, reporting whether it existed
    async fn remove(&self, key: &str) -> Result<bool>;

    /// All stored keys in lexical order
    async fn keys(&self) -> Result<Vec<String>>;
}
