//! View-model base
//!
//! Embedded in concrete view-models to provide change notification and
//! messenger subscriptions tied to the view-model's lifetime.
//!
//! ## Usage
//!
//! ```ignore
//! struct SettingsViewModel {
//!     base: ViewModelBase,
//!     title: String,
//! }
//!
//! impl SettingsViewModel {
//!     fn set_title(&mut self, title: String) {
//!         self.base.set_property(&mut self.title, title, "title");
//!     }
//! }
//! ```

use crate::messenger::{Messenger, Subscription};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use uuid::Uuid;
use vmkit_domain::PropertyChanged;
use vmkit_domain::error::Result;
use vmkit_domain::ports::dispatcher::UiDispatcher;
use vmkit_domain::ports::messenger::Subscriber;

/// Callback invoked on the UI context after a property changed
pub type PropertyListener = Arc<dyn Fn(&PropertyChanged) + Send + Sync>;

/// Identifier returned when registering a property listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

type ListenerList = Arc<RwLock<Vec<(ListenerId, PropertyListener)>>>;

/// Change notification and subscription bookkeeping for a view-model
pub struct ViewModelBase {
    dispatcher: Arc<dyn UiDispatcher>,
    listeners: ListenerList,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl ViewModelBase {
    /// Create a base notifying on `dispatcher`
    pub fn new(dispatcher: Arc<dyn UiDispatcher>) -> Self {
        Self {
            dispatcher,
            listeners: Arc::default(),
            subscriptions: Mutex::default(),
        }
    }

    /// UI context notifications run on
    pub fn dispatcher(&self) -> Arc<dyn UiDispatcher> {
        self.dispatcher.clone()
    }

    /// Store `value` in `slot` and notify if it differs from the current value
    ///
    /// Returns whether the value changed.
    pub fn set_property<T: PartialEq>(&self, slot: &mut T, value: T, property: &str) -> bool {
        if *slot == value {
            return false;
        }
        *slot = value;
        self.raise_property_changed(property);
        true
    }

    /// [`ViewModelBase::set_property`] for state behind a mutex
    ///
    /// The lock is released before listeners run.
    pub fn set_locked<T: PartialEq>(&self, slot: &Mutex<T>, value: T, property: &str) -> bool {
        {
            let mut current = slot.lock().unwrap_or_else(PoisonError::into_inner);
            if *current == value {
                return false;
            }
            *current = value;
        }
        self.raise_property_changed(property);
        true
    }

    /// Notify listeners that `property` changed
    ///
    /// Runs inline when called on the UI context, otherwise queues the
    /// notification on the dispatcher.
    pub fn raise_property_changed(&self, property: &str) {
        let event = PropertyChanged::new(property);
        let listeners = self.listeners.clone();
        self.dispatcher.run_or_dispatch(Box::new(move || {
            let snapshot: Vec<PropertyListener> = listeners
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .map(|(_, listener)| listener.clone())
                .collect();
            for listener in snapshot {
                listener(&event);
            }
        }));
    }

    /// Register a property change listener
    pub fn on_property_changed<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&PropertyChanged) + Send + Sync + 'static,
    {
        let id = ListenerId(Uuid::new_v4());
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener, reporting whether it was registered
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    /// Subscribe the owning view-model and keep the handle in this base
    ///
    /// The subscription ends when the view-model (and with it this base) is
    /// dropped, or on [`ViewModelBase::unsubscribe_all`].
    pub fn subscribe_to<S: Subscriber>(&self, messenger: &Messenger, owner: &Arc<S>) -> Result<()> {
        let subscription = messenger.subscribe(owner)?;
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(subscription);
        Ok(())
    }

    /// Drop every subscription held by this base, returning how many
    pub fn unsubscribe_all(&self) -> usize {
        let dropped: Vec<Subscription> = self
            .subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        dropped.len()
    }
}

impl std::fmt::Debug for ViewModelBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewModelBase")
            .field(
                "listeners",
                &self
                    .listeners
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .len(),
            )
            .finish()
    }
}
