//! Route registry implementation

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;
use vmkit_domain::error::{Error, Result};
use vmkit_domain::ports::routing::{RouteAction, RouteTable};

/// Path to action table shared between configuration and navigation
///
/// Registration and resolution may happen concurrently; a registration
/// replaces any previous action for the same path.
#[derive(Default)]
pub struct RouteRegistry {
    routes: RwLock<HashMap<String, RouteAction>>,
}

impl RouteRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create as Arc for sharing
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, RouteAction>> {
        self.routes.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, RouteAction>> {
        self.routes
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a synchronous action for `path`
    pub fn register<F>(&self, path: &str, action: F) -> Result<()>
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        self.register_path(path, RouteAction::new(action))
    }

    /// Whether `path` has a registered action
    pub fn contains(&self, path: &str) -> bool {
        self.read().contains_key(path)
    }

    /// Number of registered paths
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether no path is registered
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

impl RouteTable for RouteRegistry {
    fn register_path(&self, path: &str, action: RouteAction) -> Result<()> {
        if path.is_empty() {
            return Err(Error::invalid_argument("Route path cannot be empty"));
        }
        if self.write().insert(path.to_string(), action).is_some() {
            debug!(path, "Replaced route action");
        } else {
            debug!(path, "Registered route");
        }
        Ok(())
    }

    fn resolve(&self, path: &str) -> Option<RouteAction> {
        self.read().get(path).cloned()
    }

    fn unregister_path(&self, path: &str) -> bool {
        self.write().remove(path).is_some()
    }

    fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.read().keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl std::fmt::Debug for RouteRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteRegistry")
            .field("paths", &self.paths())
            .finish()
    }
}
