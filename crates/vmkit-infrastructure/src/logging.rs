//! Structured logging with tracing
//!
//! One stdout layer (plain or JSON), an optional daily rolling file layer,
//! and an `EnvFilter` that `VMKIT_LOG` can override. Layers are boxed so the
//! output format is picked at runtime without duplicating the stack.

use crate::config::AppConfig;
use crate::constants::{DEFAULT_LOG_FILE_STEM, LOG_FILTER_ENV};
use std::path::Path;
use tracing::{Level, info, warn};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use vmkit_domain::error::{Error, Result};

// Re-export LoggingConfig for convenience
pub use crate::config::LoggingConfig;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Initialize logging with the provided configuration
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let level = parse_log_level(&config.level)?;
    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(&config.level));

    let mut layers = vec![stdout_layer(&config)];
    layers.extend(file_layer(&config));

    Registry::default()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| Error::config(format!("Failed to install tracing subscriber: {e}")))?;

    info!(
        json = config.json_format,
        file = config.file_output.is_some(),
        "Logging initialized with level: {}",
        level
    );
    Ok(())
}

fn stdout_layer(config: &LoggingConfig) -> BoxedLayer {
    let layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true);
    if config.json_format {
        layer.json().boxed()
    } else {
        layer.boxed()
    }
}

fn file_layer(config: &LoggingConfig) -> Option<BoxedLayer> {
    let path = config.file_output.as_ref()?;
    let appender = tracing_appender::rolling::daily(
        path.parent().unwrap_or_else(|| Path::new(".")),
        path.file_stem()
            .unwrap_or_else(|| std::ffi::OsStr::new(DEFAULT_LOG_FILE_STEM)),
    );
    let layer = fmt::layer()
        .with_writer(appender)
        .with_ansi(false)
        .with_target(true);
    Some(if config.json_format {
        layer.json().boxed()
    } else {
        layer.boxed()
    })
}

/// Parse log level string to tracing Level
pub fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(Error::config(format!(
            "Invalid log level: {level}. Use trace, debug, info, warn, or error"
        ))),
    }
}

/// Log whether a configuration file contributed to the loaded config
pub fn log_config_loaded(config_path: &Path, found: bool) {
    if found {
        info!(path = %config_path.display(), "Configuration file merged");
    } else {
        warn!(path = %config_path.display(), "Configuration file not found, using defaults");
    }
}

/// Log the service choices a configuration makes
pub fn log_app_config(config: &AppConfig) {
    info!(
        settings_backend = ?config.settings.backend,
        settings_path = %config.settings.resolved_path().display(),
        error_policy = ?config.messenger.error_policy,
        delivery_mode = ?config.messenger.default_mode,
        ignore_unknown_routes = config.navigation.ignore_unknown_routes,
        "Application services configured"
    );
}
