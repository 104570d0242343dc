//! View-model base tests

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use vmkit_domain::error::Result;
use vmkit_domain::ports::messenger::{Receive, Registrations, Subscriber};
use vmkit_infrastructure::dispatcher::{ImmediateDispatcher, QueueDispatcher};
use vmkit_infrastructure::messenger::Messenger;
use vmkit_infrastructure::view_model::ViewModelBase;

struct ProfileViewModel {
    base: ViewModelBase,
    name: String,
}

impl ProfileViewModel {
    fn new() -> Self {
        Self {
            base: ViewModelBase::new(Arc::new(ImmediateDispatcher::new())),
            name: String::new(),
        }
    }

    fn set_name(&mut self, name: &str) -> bool {
        self.base.set_property(&mut self.name, name.to_string(), "name")
    }
}

struct UserRenamed(String);

struct StatusViewModel {
    base: ViewModelBase,
    status: Mutex<String>,
}

#[async_trait]
impl Receive<UserRenamed> for StatusViewModel {
    async fn receive(&self, message: Arc<UserRenamed>) -> Result<()> {
        self.base
            .set_locked(&self.status, format!("renamed to {}", message.0), "status");
        Ok(())
    }
}

impl Subscriber for StatusViewModel {
    fn declare(registrations: &mut Registrations<Self>) {
        registrations.receive::<UserRenamed>();
    }
}

fn record(base: &ViewModelBase) -> Arc<Mutex<Vec<String>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    base.on_property_changed(move |event| sink.lock().unwrap().push(event.property.clone()));
    seen
}

#[test]
fn test_set_property_notifies_once_per_distinct_value() {
    let mut vm = ProfileViewModel::new();
    let seen = record(&vm.base);

    assert!(vm.set_name("Ada"));
    assert!(!vm.set_name("Ada"));
    assert!(vm.set_name("Grace"));

    assert_eq!(vm.name, "Grace");
    assert_eq!(*seen.lock().unwrap(), vec!["name", "name"]);
}

#[test]
fn test_removed_listener_is_not_called() {
    let mut vm = ProfileViewModel::new();
    let seen = Arc::new(Mutex::new(0usize));
    let sink = seen.clone();
    let id = vm.base.on_property_changed(move |_| *sink.lock().unwrap() += 1);

    vm.set_name("Ada");
    assert!(vm.base.remove_listener(id));
    assert!(!vm.base.remove_listener(id));
    vm.set_name("Grace");

    assert_eq!(*seen.lock().unwrap(), 1);
}

#[test]
fn test_notifications_wait_for_ui_thread() {
    let dispatcher = Arc::new(QueueDispatcher::for_current_thread());
    let base = Arc::new(ViewModelBase::new(dispatcher.clone()));
    let seen = record(&base);

    let worker = base.clone();
    std::thread::spawn(move || worker.raise_property_changed("progress"))
        .join()
        .unwrap();

    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(dispatcher.run_pending().unwrap(), 1);
    assert_eq!(*seen.lock().unwrap(), vec!["progress"]);
}

#[tokio::test]
async fn test_subscription_lives_with_view_model() {
    let messenger = Messenger::new();
    let vm = Arc::new(StatusViewModel {
        base: ViewModelBase::new(Arc::new(ImmediateDispatcher::new())),
        status: Mutex::new(String::new()),
    });
    let seen = record(&vm.base);
    vm.base.subscribe_to(&messenger, &vm).unwrap();

    messenger
        .publish_and_wait(UserRenamed("Ada".to_string()))
        .await
        .unwrap();

    assert_eq!(*vm.status.lock().unwrap(), "renamed to Ada");
    assert_eq!(*seen.lock().unwrap(), vec!["status"]);

    drop(vm);
    assert_eq!(messenger.subscription_count(), 0);
}

#[tokio::test]
async fn test_unsubscribe_all_ends_delivery() {
    let messenger = Messenger::new();
    let vm = Arc::new(StatusViewModel {
        base: ViewModelBase::new(Arc::new(ImmediateDispatcher::new())),
        status: Mutex::new(String::from("idle")),
    });
    vm.base.subscribe_to(&messenger, &vm).unwrap();

    assert_eq!(vm.base.unsubscribe_all(), 1);
    messenger
        .publish_and_wait(UserRenamed("Ada".to_string()))
        .await
        .unwrap();

    assert_eq!(*vm.status.lock().unwrap(), "idle");
    assert!(!messenger.is_subscribed(&vm));
}
