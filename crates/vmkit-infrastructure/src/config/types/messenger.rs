//! Messenger configuration types

use serde::{Deserialize, Serialize};
use vmkit_domain::ports::messenger::DeliveryMode;

/// What happens to a handler failure after it has been logged
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Log at error level and re-raise to the publisher
    #[default]
    Propagate,
    /// Log at warn level and swallow
    LogOnly,
}

/// Messenger configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MessengerConfig {
    /// Failure policy installed as the process-wide error handler
    pub error_policy: ErrorPolicy,

    /// Delivery mode used by `Messenger::send`
    pub default_mode: DeliveryMode,
}
