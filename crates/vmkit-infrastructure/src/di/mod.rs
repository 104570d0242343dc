//! Dependency Injection
//!
//! An explicit container built at the composition root. Services are keyed
//! by type, including `dyn Trait` ports, and requested constructor
//! dependencies are resolved from the same container.
//!
//! ```text
//! ServiceContainerBuilder ──with_defaults(config)──► ServiceContainer ──► AppContext
//! ```

pub mod bootstrap;
pub mod container;

pub use bootstrap::{AppContext, DEFAULT_SERVICES, ServiceInstaller, init_app, init_test_app};
pub use container::{ServiceContainer, ServiceContainerBuilder};
