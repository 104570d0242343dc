//! Navigation configuration types

use serde::{Deserialize, Serialize};

/// Navigation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Log and ignore navigation to unregistered paths instead of failing
    pub ignore_unknown_routes: bool,
}
