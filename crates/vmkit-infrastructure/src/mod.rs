//! # Infrastructure Layer
//!
//! Implementations of the domain ports plus the cross-cutting concerns
//! (configuration, logging, dependency injection) a host needs to boot them.
//!
//! ## Module Categories
//!
//! ### Application Services
//! | Module | Description |
//! |--------|-------------|
//! | [`messenger`] | Typed publish/subscribe bus with weak subscribers |
//! | [`routing`] | Path to action table |
//! | [`navigation`] | Navigation service and in-memory page stack |
//! | [`settings`] | Typed settings over memory or JSON file backends |
//! | [`view_model`] | Change notification base for view-models |
//! | [`dispatcher`] | UI execution contexts |
//!
//! ### Configuration & DI
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Figment layered configuration |
//! | [`di`] | Service container and composition root |
//! | [`constants`] | Centralized configuration constants |
//!
//! ### Observability
//! | Module | Description |
//! |--------|-------------|
//! | [`logging`] | Structured logging with tracing |

pub mod config;
pub mod constants;
pub mod di;
pub mod dispatcher;
pub mod error_ext;
pub mod logging;
pub mod messenger;
pub mod navigation;
pub mod routing;
pub mod settings;
pub mod view_model;

// Re-export commonly used types
pub use di::{AppContext, ServiceContainer, init_app};
pub use error_ext::ErrorContext;
pub use messenger::{Messenger, Subscription};
pub use view_model::ViewModelBase;
