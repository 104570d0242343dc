//! Messenger Ports
//!
//! Defines the contracts shared by publishers, subscribers and the message bus.
//!
//! ## Architecture
//!
//! A message is any `Send + Sync + 'static` value; its concrete type is its
//! topic. Subscribers opt into a message type by implementing [`Receive<M>`]
//! and listing `M` in [`Subscriber::declare`]. The bus never owns a
//! subscriber: each registration keeps only a [`Weak`] reference, so a
//! subscriber dropped by its owner silently stops receiving.
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use vmkit_domain::error::Result;
//! use vmkit_domain::ports::messenger::{Receive, Registrations, Subscriber};
//!
//! struct SettingsSaved;
//!
//! struct StatusBar;
//!
//! #[async_trait]
//! impl Receive<SettingsSaved> for StatusBar {
//!     async fn receive(&self, _message: Arc<SettingsSaved>) -> Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! impl Subscriber for StatusBar {
//!     fn declare(registrations: &mut Registrations<Self>) {
//!         registrations.receive::<SettingsSaved>();
//!     }
//! }
//! ```

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId, type_name};
use std::marker::PhantomData;
use std::sync::{Arc, Weak};

/// Marker for values that can travel over the message bus
///
/// Blanket-implemented for every `Send + Sync + 'static` type.
pub trait Message: Any + Send + Sync {}

impl<T: Any + Send + Sync> Message for T {}

/// How `publish` waits for subscriber handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    /// Return only after every handler finished or failed
    #[default]
    #[serde(alias = "await")]
    AwaitCompletion,
    /// Dispatch handlers in the background and return immediately
    FireAndForget,
}

/// Capability to receive messages of type `M`
#[async_trait]
pub trait Receive<M: Message>: Send + Sync + 'static {
    /// Handle one delivered message
    async fn receive(&self, message: Arc<M>) -> Result<()>;
}

/// A type that declares which messages it receives
pub trait Subscriber: Send + Sync + Sized + 'static {
    /// List every message type this subscriber receives
    fn declare(registrations: &mut Registrations<Self>);
}

/// Identity of a subscriber instance on the bus
///
/// Derived from the address of the subscriber's shared allocation. The bus
/// holds a weak reference for as long as the key is registered, so the
/// address cannot be reused by another instance in the meantime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberKey(usize);

impl SubscriberKey {
    /// Key for a shared subscriber instance
    pub fn of<S>(subscriber: &Arc<S>) -> Self {
        Self(Arc::as_ptr(subscriber).cast::<()>() as usize)
    }
}

/// Names describing a single delivery, handed to error handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryContext {
    /// Type name of the message being delivered
    pub message_type: &'static str,
    /// Type name of the receiving subscriber
    pub subscriber: &'static str,
}

/// Process-wide hook for handler failures
///
/// Returning `Some` re-raises the error to the publisher once every handler
/// has run; returning `None` swallows it.
pub trait MessengerErrorHandler: Send + Sync {
    /// Inspect a failed delivery
    fn handle(&self, error: Error, context: &DeliveryContext) -> Option<Error>;
}

/// Type-erased receiver for one (subscriber, message type) pair
#[async_trait]
pub trait ErasedReceiver: Send + Sync {
    /// `TypeId` of the message this receiver accepts
    fn message_type_id(&self) -> TypeId;

    /// Delivery names for logging and error handling
    fn context(&self) -> DeliveryContext;

    /// Whether the subscriber is still alive
    fn is_alive(&self) -> bool;

    /// Deliver a message
    ///
    /// Returns `None` when the subscriber has been dropped.
    async fn deliver(&self, message: Arc<dyn Any + Send + Sync>) -> Option<Result<()>>;
}

struct WeakReceiver<S, M> {
    target: Weak<S>,
    _message: PhantomData<fn(M)>,
}

#[async_trait]
impl<S, M> ErasedReceiver for WeakReceiver<S, M>
where
    S: Subscriber + Receive<M>,
    M: Message,
{
    fn message_type_id(&self) -> TypeId {
        TypeId::of::<M>()
    }

    fn context(&self) -> DeliveryContext {
        DeliveryContext {
            message_type: type_name::<M>(),
            subscriber: type_name::<S>(),
        }
    }

    fn is_alive(&self) -> bool {
        self.target.strong_count() > 0
    }

    async fn deliver(&self, message: Arc<dyn Any + Send + Sync>) -> Option<Result<()>> {
        let subscriber = self.target.upgrade()?;
        let Ok(message) = message.downcast::<M>() else {
            return Some(Err(Error::internal(format!(
                "message routed to the wrong receiver, expected {}",
                type_name::<M>()
            ))));
        };
        Some(<S as Receive<M>>::receive(&subscriber, message).await)
    }
}

/// Builder collecting the message types a subscriber receives
pub struct Registrations<S> {
    target: Weak<S>,
    receivers: Vec<Arc<dyn ErasedReceiver>>,
}

impl<S: Subscriber> Registrations<S> {
    /// Collect the declared registrations of a subscriber instance
    pub fn collect(subscriber: &Arc<S>) -> Self {
        let mut registrations = Self {
            target: Arc::downgrade(subscriber),
            receivers: Vec::new(),
        };
        S::declare(&mut registrations);
        registrations
    }

    /// Declare that the subscriber receives messages of type `M`
    ///
    /// Declaring the same type twice has no further effect.
    pub fn receive<M: Message>(&mut self) -> &mut Self
    where
        S: Receive<M>,
    {
        let type_id = TypeId::of::<M>();
        if self
            .receivers
            .iter()
            .all(|receiver| receiver.message_type_id() != type_id)
        {
            self.receivers.push(Arc::new(WeakReceiver::<S, M> {
                target: self.target.clone(),
                _message: PhantomData,
            }));
        }
        self
    }
}

impl<S> Registrations<S> {
    /// Number of declared message types
    pub fn len(&self) -> usize {
        self.receivers.len()
    }

    /// Whether no message type was declared
    pub fn is_empty(&self) -> bool {
        self.receivers.is_empty()
    }

    /// Consume the builder, yielding the erased receivers in declaration order
    pub fn into_receivers(self) -> Vec<Arc<dyn ErasedReceiver>> {
        self.receivers
    }
}
