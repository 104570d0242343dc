//! Infrastructure layer constants
//!
//! Contains constants that are part of the infrastructure implementation.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "vmkit.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "vmkit";

/// Environment variable prefix for configuration
pub const CONFIG_ENV_PREFIX: &str = "VMKIT";

/// Separator between nested keys in environment variables (`VMKIT__LOGGING__LEVEL`)
pub const CONFIG_ENV_SEPARATOR: &str = "__";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable overriding the log filter
pub const LOG_FILTER_ENV: &str = "VMKIT_LOG";

/// Log file stem used when the configured path has none
pub const DEFAULT_LOG_FILE_STEM: &str = "vmkit";

// ============================================================================
// SETTINGS CONSTANTS
// ============================================================================

/// Default settings file name
pub const DEFAULT_SETTINGS_FILENAME: &str = "settings.json";

/// Suffix of the temporary file written before an atomic settings replace
pub const SETTINGS_TEMP_SUFFIX: &str = "tmp";

// ============================================================================
// DISPATCHER CONSTANTS
// ============================================================================

/// Upper bound of jobs drained by a single `QueueDispatcher::run_pending` call
pub const DISPATCHER_MAX_BATCH: usize = 1024;
