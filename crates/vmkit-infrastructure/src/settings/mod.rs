//! Settings Infrastructure
//!
//! Typed key/value settings over a pluggable persistence backend.
//!
//! ## Available Backends
//!
//! | Backend | Persistence | Description |
//! |---------|-------------|-------------|
//! | [`InMemorySettingsBackend`] | Process | Concurrent map, lost on exit |
//! | [`JsonFileSettingsBackend`] | Disk | Single JSON object file |

mod file;
mod memory;
mod service;

pub use file::JsonFileSettingsBackend;
pub use memory::InMemorySettingsBackend;
pub use service::{SettingsService, backend_from_config};
