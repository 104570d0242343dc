//! In-process typed message bus
//!
//! Delivers messages by exact type to subscribers held through weak
//! references.
//!
//! ## Delivery
//!
//! - Subscribers receive messages in subscription order.
//! - Each handler failure or panic is caught, handed to the error handler,
//!   and never stops delivery to the remaining subscribers.
//! - Deliveries to one subscriber are serialized; deliveries to different
//!   subscribers and independent publishes are not.
//!
//! A handler that publishes a message it receives itself must use
//! [`DeliveryMode::FireAndForget`]; awaiting its own delivery would wait on
//! the gate it already holds.

use super::error_handler::{LoggingErrorHandler, handler_for_policy};
use super::subscription::Subscription;
use crate::config::MessengerConfig;
use futures::FutureExt;
use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, error, warn};
use uuid::Uuid;
use vmkit_domain::error::{Error, Result};
use vmkit_domain::ports::messenger::{
    DeliveryMode, ErasedReceiver, Message, MessengerErrorHandler, Registrations, Subscriber,
    SubscriberKey,
};

/// One (subscriber, message type) registration
struct Entry {
    key: SubscriberKey,
    type_id: TypeId,
    receiver: Arc<dyn ErasedReceiver>,
    gate: Arc<AsyncMutex<()>>,
}

/// Outstanding handles for one subscriber registration
struct HandleCount {
    registration: Uuid,
    count: usize,
}

#[derive(Default)]
struct State {
    entries: Vec<Entry>,
    handles: HashMap<SubscriberKey, HandleCount>,
}

impl State {
    fn remove_key(&mut self, key: SubscriberKey) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.key != key);
        self.handles.remove(&key);
        before - self.entries.len()
    }

    fn prune_expired(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.receiver.is_alive());
        let entries = &self.entries;
        self.handles
            .retain(|key, _| entries.iter().any(|entry| entry.key == *key));
        before - self.entries.len()
    }
}

/// Snapshot of one delivery target taken under the table lock
struct Target {
    receiver: Arc<dyn ErasedReceiver>,
    gate: Arc<AsyncMutex<()>>,
}

pub(super) struct MessengerInner {
    state: RwLock<State>,
    error_handler: RwLock<Arc<dyn MessengerErrorHandler>>,
    default_mode: DeliveryMode,
}

impl MessengerInner {
    fn read_state(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, State> {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn error_handler(&self) -> Arc<dyn MessengerErrorHandler> {
        self.error_handler
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Drop one handle; the last handle of a registration unsubscribes it
    pub(super) fn release(&self, key: SubscriberKey, registration: Uuid) {
        let mut guard = self.write_state();
        let state = &mut *guard;
        let Some(handles) = state.handles.get_mut(&key) else {
            return;
        };
        if handles.registration != registration {
            return;
        }
        handles.count -= 1;
        if handles.count == 0 {
            let removed = state.remove_key(key);
            debug!("Last subscription handle dropped, removed {} entries", removed);
        }
    }

    pub(super) fn is_registered(&self, key: SubscriberKey, registration: Uuid) -> bool {
        self.read_state()
            .handles
            .get(&key)
            .is_some_and(|handles| handles.registration == registration)
    }

    fn targets(&self, type_id: TypeId) -> Vec<Target> {
        let state = self.read_state();
        state
            .entries
            .iter()
            .filter(|entry| entry.type_id == type_id && entry.receiver.is_alive())
            .map(|entry| Target {
                receiver: entry.receiver.clone(),
                gate: entry.gate.clone(),
            })
            .collect()
    }

    fn prune(&self) -> usize {
        let removed = self.write_state().prune_expired();
        if removed > 0 {
            warn!("Pruned {} subscriptions of dropped subscribers", removed);
        }
        removed
    }

    async fn deliver_all(
        &self,
        targets: Vec<Target>,
        message: Arc<dyn Any + Send + Sync>,
    ) -> Result<()> {
        let handler = self.error_handler();
        let mut raised = Vec::new();
        let mut delivered = 0usize;
        let mut expired = false;

        for target in targets {
            let context = target.receiver.context();
            let _gate = target.gate.lock().await;
            let outcome = AssertUnwindSafe(target.receiver.deliver(message.clone()))
                .catch_unwind()
                .await;

            let failure = match outcome {
                Ok(None) => {
                    expired = true;
                    None
                }
                Ok(Some(Ok(()))) => {
                    delivered += 1;
                    None
                }
                Ok(Some(Err(err))) => Some(err),
                Err(payload) => Some(Error::handler_panicked(
                    context.message_type,
                    context.subscriber,
                    panic_message(payload.as_ref()),
                )),
            };

            if let Some(err) = failure {
                if let Some(err) = handler.handle(err, &context) {
                    raised.push(err);
                }
            }
        }

        if expired {
            self.prune();
        }
        debug!("Delivered message to {} subscribers", delivered);

        Error::from_many(raised)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Typed publish/subscribe bus
///
/// Cloning shares the same subscription table.
#[derive(Clone)]
pub struct Messenger {
    inner: Arc<MessengerInner>,
}

impl Messenger {
    /// Create a messenger with the logging error handler
    pub fn new() -> Self {
        Self::with_error_handler(Arc::new(LoggingErrorHandler))
    }

    /// Create a messenger with a custom error handler
    pub fn with_error_handler(handler: Arc<dyn MessengerErrorHandler>) -> Self {
        Self::build(handler, DeliveryMode::default())
    }

    /// Create a messenger from configuration
    pub fn from_config(config: &MessengerConfig) -> Self {
        Self::build(handler_for_policy(config.error_policy), config.default_mode)
    }

    fn build(handler: Arc<dyn MessengerErrorHandler>, default_mode: DeliveryMode) -> Self {
        Self {
            inner: Arc::new(MessengerInner {
                state: RwLock::new(State::default()),
                error_handler: RwLock::new(handler),
                default_mode,
            }),
        }
    }

    /// Create as Arc for sharing
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Replace the error handler for all subsequent deliveries
    pub fn set_error_handler(&self, handler: Arc<dyn MessengerErrorHandler>) {
        *self
            .inner
            .error_handler
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = handler;
    }

    /// Delivery mode used by [`Messenger::send`]
    pub fn default_mode(&self) -> DeliveryMode {
        self.inner.default_mode
    }

    /// Register `subscriber` for every message type it declares
    ///
    /// Subscribing an instance twice adds no registrations; it returns a
    /// further handle to the existing one. The subscription ends when every
    /// handle is dropped, when [`Messenger::unsubscribe`] is called, or when
    /// the subscriber itself is dropped.
    pub fn subscribe<S: Subscriber>(&self, subscriber: &Arc<S>) -> Result<Subscription> {
        let key = SubscriberKey::of(subscriber);
        let registrations = Registrations::collect(subscriber);
        if registrations.is_empty() {
            return Err(Error::invalid_argument(format!(
                "{} declares no message types",
                type_name::<S>()
            )));
        }

        let mut guard = self.inner.write_state();
        let state = &mut *guard;
        let registration = match state.handles.get_mut(&key) {
            Some(handles) => {
                handles.count += 1;
                debug!("{} already subscribed, sharing registration", type_name::<S>());
                handles.registration
            }
            None => {
                let registration = Uuid::new_v4();
                let gate = Arc::new(AsyncMutex::new(()));
                let count = registrations.len();
                for receiver in registrations.into_receivers() {
                    state.entries.push(Entry {
                        key,
                        type_id: receiver.message_type_id(),
                        receiver,
                        gate: gate.clone(),
                    });
                }
                state.handles.insert(
                    key,
                    HandleCount {
                        registration,
                        count: 1,
                    },
                );
                debug!("Subscribed {} to {} message types", type_name::<S>(), count);
                registration
            }
        };

        Ok(Subscription::new(
            Arc::downgrade(&self.inner),
            key,
            registration,
            type_name::<S>(),
        ))
    }

    /// Remove every registration of `subscriber`
    ///
    /// Returns whether anything was registered.
    pub fn unsubscribe<S: Subscriber>(&self, subscriber: &Arc<S>) -> bool {
        let removed = self
            .inner
            .write_state()
            .remove_key(SubscriberKey::of(subscriber));
        if removed > 0 {
            debug!("Unsubscribed {} from {} message types", type_name::<S>(), removed);
        }
        removed > 0
    }

    /// Whether `subscriber` currently has registrations
    pub fn is_subscribed<S: Subscriber>(&self, subscriber: &Arc<S>) -> bool {
        self.inner
            .read_state()
            .handles
            .contains_key(&SubscriberKey::of(subscriber))
    }

    /// Publish `message` to every live subscriber of its exact type
    pub async fn publish<M: Message>(&self, message: M, mode: DeliveryMode) -> Result<()> {
        self.publish_shared(Arc::new(message), mode).await
    }

    /// Publish an already shared message
    pub async fn publish_shared<M: Message>(
        &self,
        message: Arc<M>,
        mode: DeliveryMode,
    ) -> Result<()> {
        let targets = self.inner.targets(TypeId::of::<M>());
        if targets.is_empty() {
            debug!("Published {} but no subscribers", type_name::<M>());
            // Entries may have expired since the last publish
            self.inner.prune();
            return Ok(());
        }

        let message: Arc<dyn Any + Send + Sync> = message;
        match mode {
            DeliveryMode::AwaitCompletion => self.inner.deliver_all(targets, message).await,
            DeliveryMode::FireAndForget => {
                let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
                    Error::internal("fire-and-forget publish requires a running tokio runtime")
                })?;
                let inner = self.inner.clone();
                runtime.spawn(async move {
                    if let Err(err) = inner.deliver_all(targets, message).await {
                        error!(
                            message_type = type_name::<M>(),
                            error = %err,
                            "Background delivery failed with no caller to report to"
                        );
                    }
                });
                Ok(())
            }
        }
    }

    /// Publish and wait for every handler
    pub async fn publish_and_wait<M: Message>(&self, message: M) -> Result<()> {
        self.publish(message, DeliveryMode::AwaitCompletion).await
    }

    /// Publish without waiting for handlers
    pub async fn post<M: Message>(&self, message: M) -> Result<()> {
        self.publish(message, DeliveryMode::FireAndForget).await
    }

    /// Publish with the configured default mode
    pub async fn send<M: Message>(&self, message: M) -> Result<()> {
        self.publish(message, self.inner.default_mode).await
    }

    /// Number of live subscribers for message type `M`
    pub fn subscriber_count<M: Message>(&self) -> usize {
        let type_id = TypeId::of::<M>();
        self.inner
            .read_state()
            .entries
            .iter()
            .filter(|entry| entry.type_id == type_id && entry.receiver.is_alive())
            .count()
    }

    /// Total number of registrations, including expired ones not yet pruned
    pub fn subscription_count(&self) -> usize {
        self.inner.read_state().entries.len()
    }

    /// Remove registrations of dropped subscribers now
    pub fn prune(&self) -> usize {
        self.inner.prune()
    }
}

impl Default for Messenger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Messenger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.read_state();
        f.debug_struct("Messenger")
            .field("subscriptions", &state.entries.len())
            .field("subscribers", &state.handles.len())
            .field("default_mode", &self.inner.default_mode)
            .finish()
    }
}
