//! Configuration types module

pub mod app;
pub mod logging;
pub mod messenger;
pub mod navigation;
pub mod settings;

// Re-export main types
pub use app::AppConfig;
pub use logging::LoggingConfig;
pub use messenger::{ErrorPolicy, MessengerConfig};
pub use navigation::NavigationConfig;
pub use settings::{SettingsBackendKind, SettingsConfig};
