//! Configuration management
//!
//! Layered application configuration loaded through Figment: built-in
//! defaults, then a TOML file, then `VMKIT__`-prefixed environment
//! variables.

pub mod loader;
pub mod types;

pub use loader::{ConfigBuilder, ConfigLoader};
pub use types::*;
