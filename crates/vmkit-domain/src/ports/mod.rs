//! Domain Port Interfaces
//!
//! Contracts consumed by view-models and implemented by the
//! infrastructure layer.
//!
//! | Port | Purpose |
//! |------|---------|
//! | [`messenger`] | Typed publish/subscribe contracts |
//! | [`routing`] | Path to action table |
//! | [`navigation`] | Page navigation and platform back stack |
//! | [`settings`] | Persistent key-value storage |
//! | [`dispatcher`] | UI execution context |

pub mod dispatcher;
pub mod messenger;
pub mod navigation;
pub mod routing;
pub mod settings;

pub use dispatcher::{DispatchJob, UiDispatcher};
pub use messenger::{
    DeliveryContext, DeliveryMode, ErasedReceiver, Message, MessengerErrorHandler, Receive,
    Registrations, Subscriber, SubscriberKey,
};
pub use navigation::{Navigator, PlatformNavigator};
pub use routing::{ActionFuture, RouteAction, RouteTable};
pub use settings::SettingsBackend;
