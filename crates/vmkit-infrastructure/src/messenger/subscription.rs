//! Subscription handles

use super::bus::MessengerInner;
use std::fmt;
use std::sync::Weak;
use uuid::Uuid;
use vmkit_domain::ports::messenger::SubscriberKey;

/// Handle tying a subscriber's registrations to an owning scope
///
/// Dropping the last handle of a registration unsubscribes the subscriber.
/// Handles never keep the subscriber or the messenger alive.
#[must_use = "dropping a Subscription immediately unsubscribes; call `detach` to keep it"]
pub struct Subscription {
    messenger: Weak<MessengerInner>,
    key: SubscriberKey,
    registration: Uuid,
    subscriber: &'static str,
    attached: bool,
}

impl Subscription {
    pub(super) fn new(
        messenger: Weak<MessengerInner>,
        key: SubscriberKey,
        registration: Uuid,
        subscriber: &'static str,
    ) -> Self {
        Self {
            messenger,
            key,
            registration,
            subscriber,
            attached: true,
        }
    }

    /// Identifier of the registration this handle refers to
    pub fn registration(&self) -> Uuid {
        self.registration
    }

    /// Type name of the subscriber
    pub fn subscriber(&self) -> &'static str {
        self.subscriber
    }

    /// Whether the registration is still present on the messenger
    pub fn is_active(&self) -> bool {
        self.messenger
            .upgrade()
            .is_some_and(|inner| inner.is_registered(self.key, self.registration))
    }

    /// Release the handle without unsubscribing
    ///
    /// The registration then ends only through `Messenger::unsubscribe` or
    /// when the subscriber is dropped.
    pub fn detach(mut self) {
        self.attached = false;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if !self.attached {
            return;
        }
        if let Some(inner) = self.messenger.upgrade() {
            inner.release(self.key, self.registration);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("subscriber", &self.subscriber)
            .field("registration", &self.registration)
            .field("attached", &self.attached)
            .finish()
    }
}
