//! Main application configuration

use super::{LoggingConfig, MessengerConfig, NavigationConfig, SettingsConfig};
use serde::{Deserialize, Serialize};

/// Root configuration consumed by the composition root
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Messenger configuration
    pub messenger: MessengerConfig,
    /// Settings storage configuration
    pub settings: SettingsConfig,
    /// Navigation configuration
    pub navigation: NavigationConfig,
}
