//! In-memory settings backend

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use vmkit_domain::error::Result;
use vmkit_domain::ports::settings::SettingsBackend;

/// Settings backend holding values in a concurrent map
#[derive(Debug, Default)]
pub struct InMemorySettingsBackend {
    values: DashMap<String, Value>,
}

impl InMemorySettingsBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsBackend for InMemorySettingsBackend {
    fn backend_name(&self) -> &str {
        "memory"
    }

    async fn load(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.get(key).map(|value| value.value().clone()))
    }

    async fn save(&self, key: &str, value: Value) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.values.remove(key).is_some())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.values.iter().map(|entry| entry.key().clone()).collect();
        keys.sort();
        Ok(keys)
    }
}
