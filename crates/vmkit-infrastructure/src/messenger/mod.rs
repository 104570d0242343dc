//! Messenger
//!
//! Typed publish/subscribe between view-models and services.
//!
//! ## Components
//!
//! - [`Messenger`] - In-process bus keyed by message type
//! - [`Subscription`] - Handle controlling how long a registration lives
//! - [`LoggingErrorHandler`] / [`SilentErrorHandler`] - Handler failure policies
//!
//! ## Usage
//!
//! ```ignore
//! let messenger = Messenger::new();
//! let _subscription = messenger.subscribe(&status_bar)?;
//! messenger.publish_and_wait(SettingsSaved).await?;
//! ```

mod bus;
mod error_handler;
mod subscription;

pub use bus::Messenger;
pub use error_handler::{LoggingErrorHandler, SilentErrorHandler, handler_for_policy};
pub use subscription::Subscription;
