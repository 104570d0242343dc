//! # vmkit
//!
//! Application services for view-model style front ends.
//!
//! This crate is the public facade: it re-exports the domain types and the
//! infrastructure implementations, and hosts the headless shell behind the
//! `vmkit` binary.
//!
//! ## Features
//!
//! - **Messenger**: typed publish/subscribe keyed by message type
//! - **Navigation**: path routing with back navigation delegated to the platform
//! - **Settings**: typed settings persisted in memory or a JSON file
//! - **View-models**: change notification marshalled onto the UI context
//! - **Dependency injection**: an explicit container built at the composition root
//!
//! ## Example
//!
//! ```ignore
//! use vmkit::infrastructure::{config::AppConfig, init_app};
//!
//! let context = init_app(AppConfig::default())?;
//! context.routes().register("/Settings", || Ok(()))?;
//! context.navigator().navigate("/Settings").await?;
//! ```
//!
//! ## Architecture
//!
//! - `domain` - Error type, value objects and port traits
//! - `infrastructure` - Port implementations, config, logging and DI
//! - `shell` - Headless host driving a navigation script

/// Domain layer - core types and ports
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use vmkit_domain::*;
}

/// Infrastructure layer - services, config and DI
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use vmkit_infrastructure::*;
}

pub mod shell;

// Re-export commonly used domain types at the crate root
pub use domain::*;

// Re-export main entry point at the crate root
pub use shell::run_shell;
