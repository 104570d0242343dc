//! Messenger delivery, lifetime and failure tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use vmkit_domain::error::{Error, Result};
use vmkit_domain::ports::messenger::{
    DeliveryContext, DeliveryMode, MessengerErrorHandler, Receive, Registrations, Subscriber,
};
use vmkit_infrastructure::config::{ErrorPolicy, MessengerConfig};
use vmkit_infrastructure::messenger::{Messenger, SilentErrorHandler};

#[derive(Debug)]
struct ExampleMessage {
    text: String,
}

impl ExampleMessage {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

struct OtherMessage;

type Log = Arc<Mutex<Vec<String>>>;

struct Recorder {
    name: &'static str,
    log: Log,
}

impl Recorder {
    fn shared(name: &'static str, log: &Log) -> Arc<Self> {
        Arc::new(Self {
            name,
            log: log.clone(),
        })
    }
}

#[async_trait]
impl Receive<ExampleMessage> for Recorder {
    async fn receive(&self, message: Arc<ExampleMessage>) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("{}:{}", self.name, message.text));
        Ok(())
    }
}

impl Subscriber for Recorder {
    fn declare(registrations: &mut Registrations<Self>) {
        registrations.receive::<ExampleMessage>();
    }
}

#[derive(Default)]
struct OtherListener {
    calls: AtomicUsize,
}

#[async_trait]
impl Receive<OtherMessage> for OtherListener {
    async fn receive(&self, _message: Arc<OtherMessage>) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Subscriber for OtherListener {
    fn declare(registrations: &mut Registrations<Self>) {
        registrations.receive::<OtherMessage>();
    }
}

struct Failing;

#[async_trait]
impl Receive<ExampleMessage> for Failing {
    async fn receive(&self, message: Arc<ExampleMessage>) -> Result<()> {
        Err(Error::internal(format!("cannot handle {}", message.text)))
    }
}

impl Subscriber for Failing {
    fn declare(registrations: &mut Registrations<Self>) {
        registrations.receive::<ExampleMessage>();
    }
}

struct Panicking;

#[async_trait]
impl Receive<ExampleMessage> for Panicking {
    async fn receive(&self, _message: Arc<ExampleMessage>) -> Result<()> {
        panic!("boom");
    }
}

impl Subscriber for Panicking {
    fn declare(registrations: &mut Registrations<Self>) {
        registrations.receive::<ExampleMessage>();
    }
}

struct Capturing {
    seen: Mutex<Vec<Arc<ExampleMessage>>>,
}

#[async_trait]
impl Receive<ExampleMessage> for Capturing {
    async fn receive(&self, message: Arc<ExampleMessage>) -> Result<()> {
        self.seen.lock().unwrap().push(message);
        Ok(())
    }
}

impl Subscriber for Capturing {
    fn declare(registrations: &mut Registrations<Self>) {
        registrations.receive::<ExampleMessage>();
    }
}

struct Forwarder {
    sender: mpsc::UnboundedSender<String>,
}

#[async_trait]
impl Receive<ExampleMessage> for Forwarder {
    async fn receive(&self, message: Arc<ExampleMessage>) -> Result<()> {
        self.sender
            .send(message.text.clone())
            .map_err(|e| Error::internal(e.to_string()))
    }
}

impl Subscriber for Forwarder {
    fn declare(registrations: &mut Registrations<Self>) {
        registrations.receive::<ExampleMessage>();
    }
}

struct Deaf;

impl Subscriber for Deaf {
    fn declare(_registrations: &mut Registrations<Self>) {}
}

#[derive(Default)]
struct CountingHandler {
    failures: AtomicUsize,
    subscribers: Mutex<Vec<&'static str>>,
}

impl MessengerErrorHandler for CountingHandler {
    fn handle(&self, _error: Error, context: &DeliveryContext) -> Option<Error> {
        self.failures.fetch_add(1, Ordering::SeqCst);
        self.subscribers.lock().unwrap().push(context.subscriber);
        None
    }
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

#[tokio::test]
async fn test_example_message_reaches_its_subscriber_once() {
    let messenger = Messenger::new();
    let subscriber = Arc::new(Capturing {
        seen: Mutex::new(Vec::new()),
    });
    let _subscription = messenger.subscribe(&subscriber).unwrap();

    let message = Arc::new(ExampleMessage::new("hello"));
    messenger
        .publish_shared(message.clone(), DeliveryMode::AwaitCompletion)
        .await
        .unwrap();

    let seen = subscriber.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(Arc::ptr_eq(&seen[0], &message));
}

#[tokio::test]
async fn test_publish_skips_subscribers_of_other_types() {
    let messenger = Messenger::new();
    let log = Log::default();
    let recorder = Recorder::shared("a", &log);
    let other = Arc::new(OtherListener::default());
    let _a = messenger.subscribe(&recorder).unwrap();
    let _b = messenger.subscribe(&other).unwrap();

    messenger
        .publish_and_wait(ExampleMessage::new("x"))
        .await
        .unwrap();

    assert_eq!(entries(&log), vec!["a:x"]);
    assert_eq!(other.calls.load(Ordering::SeqCst), 0);

    messenger.publish_and_wait(OtherMessage).await.unwrap();
    assert_eq!(other.calls.load(Ordering::SeqCst), 1);
    assert_eq!(entries(&log).len(), 1);
}

#[tokio::test]
async fn test_delivery_follows_subscription_order() {
    let messenger = Messenger::new();
    let log = Log::default();
    let first = Recorder::shared("first", &log);
    let second = Recorder::shared("second", &log);
    let third = Recorder::shared("third", &log);
    let _s1 = messenger.subscribe(&first).unwrap();
    let _s2 = messenger.subscribe(&second).unwrap();
    let _s3 = messenger.subscribe(&third).unwrap();

    messenger
        .publish_and_wait(ExampleMessage::new("go"))
        .await
        .unwrap();

    assert_eq!(entries(&log), vec!["first:go", "second:go", "third:go"]);
}

#[tokio::test]
async fn test_publish_without_subscribers_succeeds() {
    let messenger = Messenger::new();
    messenger
        .publish_and_wait(ExampleMessage::new("nobody"))
        .await
        .unwrap();
    assert_eq!(messenger.subscription_count(), 0);
}

#[tokio::test]
async fn test_unsubscribe_stops_delivery() {
    let messenger = Messenger::new();
    let log = Log::default();
    let recorder = Recorder::shared("a", &log);
    let subscription = messenger.subscribe(&recorder).unwrap();
    subscription.detach();

    assert!(messenger.unsubscribe(&recorder));
    assert!(!messenger.unsubscribe(&recorder));
    assert!(!messenger.is_subscribed(&recorder));

    messenger
        .publish_and_wait(ExampleMessage::new("x"))
        .await
        .unwrap();
    assert!(entries(&log).is_empty());
}

#[test]
fn test_unsubscribe_when_never_subscribed_is_safe() {
    let messenger = Messenger::new();
    let recorder = Recorder::shared("a", &Log::default());
    assert!(!messenger.unsubscribe(&recorder));
}

#[tokio::test]
async fn test_dropping_handle_unsubscribes() {
    let messenger = Messenger::new();
    let log = Log::default();
    let recorder = Recorder::shared("a", &log);
    {
        let subscription = messenger.subscribe(&recorder).unwrap();
        assert!(subscription.is_active());
    }

    assert!(!messenger.is_subscribed(&recorder));
    messenger
        .publish_and_wait(ExampleMessage::new("x"))
        .await
        .unwrap();
    assert!(entries(&log).is_empty());
}

#[tokio::test]
async fn test_dropped_subscriber_is_pruned() {
    let messenger = Messenger::new();
    let log = Log::default();
    let recorder = Recorder::shared("a", &log);
    let subscription = messenger.subscribe(&recorder).unwrap();
    assert_eq!(messenger.subscription_count(), 1);

    drop(recorder);
    assert_eq!(messenger.subscriber_count::<ExampleMessage>(), 0);

    messenger
        .publish_and_wait(ExampleMessage::new("x"))
        .await
        .unwrap();

    assert!(entries(&log).is_empty());
    assert_eq!(messenger.subscription_count(), 0);
    assert!(!subscription.is_active());
}

#[test]
fn test_prune_reports_removed_entries() {
    let messenger = Messenger::new();
    let recorder = Recorder::shared("a", &Log::default());
    messenger.subscribe(&recorder).unwrap().detach();

    drop(recorder);

    assert_eq!(messenger.prune(), 1);
    assert_eq!(messenger.prune(), 0);
}

#[tokio::test]
async fn test_subscribe_twice_delivers_once() {
    let messenger = Messenger::new();
    let log = Log::default();
    let recorder = Recorder::shared("a", &log);
    let first = messenger.subscribe(&recorder).unwrap();
    let second = messenger.subscribe(&recorder).unwrap();

    assert_eq!(first.registration(), second.registration());
    assert_eq!(messenger.subscription_count(), 1);

    messenger
        .publish_and_wait(ExampleMessage::new("x"))
        .await
        .unwrap();
    assert_eq!(entries(&log), vec!["a:x"]);

    drop(first);
    assert!(messenger.is_subscribed(&recorder));
    drop(second);
    assert!(!messenger.is_subscribed(&recorder));
}

#[test]
fn test_subscriber_without_declarations_is_rejected() {
    let messenger = Messenger::new();
    let err = messenger.subscribe(&Arc::new(Deaf)).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));
}

#[test]
fn test_subscriber_count_per_type() {
    let messenger = Messenger::new();
    let log = Log::default();
    let a = Recorder::shared("a", &log);
    let b = Recorder::shared("b", &log);
    let other = Arc::new(OtherListener::default());
    let _sa = messenger.subscribe(&a).unwrap();
    let _sb = messenger.subscribe(&b).unwrap();
    let _so = messenger.subscribe(&other).unwrap();

    assert_eq!(messenger.subscriber_count::<ExampleMessage>(), 2);
    assert_eq!(messenger.subscriber_count::<OtherMessage>(), 1);
    assert_eq!(messenger.subscription_count(), 3);
}

#[tokio::test]
async fn test_single_handler_failure_is_reraised() {
    let messenger = Messenger::new();
    let failing = Arc::new(Failing);
    let _s = messenger.subscribe(&failing).unwrap();

    let err = messenger
        .publish_and_wait(ExampleMessage::new("x"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Internal { .. }));
    assert!(err.to_string().contains("cannot handle x"));
}

#[tokio::test]
async fn test_failures_are_aggregated_after_all_handlers_ran() {
    let messenger = Messenger::new();
    let log = Log::default();
    let first = Arc::new(Failing);
    let recorder = Recorder::shared("ok", &log);
    let second = Arc::new(Panicking);
    let _s1 = messenger.subscribe(&first).unwrap();
    let _s2 = messenger.subscribe(&recorder).unwrap();
    let _s3 = messenger.subscribe(&second).unwrap();

    let err = messenger
        .publish_and_wait(ExampleMessage::new("x"))
        .await
        .unwrap_err();

    assert_eq!(entries(&log), vec!["ok:x"]);
    match err {
        Error::Aggregate { errors } => {
            assert_eq!(errors.len(), 2);
            assert!(matches!(errors[0], Error::Internal { .. }));
            assert!(matches!(errors[1], Error::HandlerPanicked { .. }));
        }
        other => panic!("expected aggregate error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_handler_panic_is_caught() {
    let messenger = Messenger::new();
    let panicking = Arc::new(Panicking);
    let _s = messenger.subscribe(&panicking).unwrap();

    let err = messenger
        .publish_and_wait(ExampleMessage::new("x"))
        .await
        .unwrap_err();

    match err {
        Error::HandlerPanicked {
            subscriber, panic, ..
        } => {
            assert!(subscriber.ends_with("Panicking"));
            assert_eq!(panic, "boom");
        }
        other => panic!("expected handler panic, got {other:?}"),
    }
}

#[tokio::test]
async fn test_silent_handler_swallows_failures() {
    let messenger = Messenger::with_error_handler(Arc::new(SilentErrorHandler));
    let failing = Arc::new(Failing);
    let _s = messenger.subscribe(&failing).unwrap();

    messenger
        .publish_and_wait(ExampleMessage::new("x"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_custom_error_handler_sees_delivery_context() {
    let handler = Arc::new(CountingHandler::default());
    let messenger = Messenger::new();
    messenger.set_error_handler(handler.clone());
    let failing = Arc::new(Failing);
    let _s = messenger.subscribe(&failing).unwrap();

    messenger
        .publish_and_wait(ExampleMessage::new("x"))
        .await
        .unwrap();

    assert_eq!(handler.failures.load(Ordering::SeqCst), 1);
    let subscribers = handler.subscribers.lock().unwrap();
    assert!(subscribers[0].ends_with("Failing"));
}

#[tokio::test]
async fn test_log_only_policy_from_config() {
    let config = MessengerConfig {
        error_policy: ErrorPolicy::LogOnly,
        default_mode: DeliveryMode::AwaitCompletion,
    };
    let messenger = Messenger::from_config(&config);
    let failing = Arc::new(Failing);
    let _s = messenger.subscribe(&failing).unwrap();

    messenger.send(ExampleMessage::new("x")).await.unwrap();
}

#[tokio::test]
async fn test_fire_and_forget_delivers_in_background() {
    let messenger = Messenger::new();
    let (sender, mut receiver) = mpsc::unbounded_channel();
    let forwarder = Arc::new(Forwarder { sender });
    let _s = messenger.subscribe(&forwarder).unwrap();

    messenger.post(ExampleMessage::new("later")).await.unwrap();

    let delivered = tokio::time::timeout(Duration::from_secs(5), receiver.recv())
        .await
        .unwrap();
    assert_eq!(delivered.as_deref(), Some("later"));
}

#[tokio::test]
async fn test_send_uses_configured_default_mode() {
    let config = MessengerConfig {
        error_policy: ErrorPolicy::Propagate,
        default_mode: DeliveryMode::FireAndForget,
    };
    let messenger = Messenger::from_config(&config);
    assert_eq!(messenger.default_mode(), DeliveryMode::FireAndForget);

    let failing = Arc::new(Failing);
    let _s = messenger.subscribe(&failing).unwrap();

    // Background failures have no caller to reach
    messenger.send(ExampleMessage::new("x")).await.unwrap();
}

#[test]
fn test_fire_and_forget_requires_runtime() {
    let messenger = Messenger::new();
    let recorder = Recorder::shared("a", &Log::default());
    let _s = messenger.subscribe(&recorder).unwrap();

    let err = futures::executor::block_on(messenger.post(ExampleMessage::new("x"))).unwrap_err();
    assert!(matches!(err, Error::Internal { .. }));
}

#[tokio::test]
async fn test_clones_share_subscriptions() {
    let messenger = Messenger::new();
    let clone = messenger.clone();
    let log = Log::default();
    let recorder = Recorder::shared("a", &log);
    let _s = messenger.subscribe(&recorder).unwrap();

    clone
        .publish_and_wait(ExampleMessage::new("shared"))
        .await
        .unwrap();
    assert_eq!(entries(&log), vec!["a:shared"]);
}

#[test]
fn test_handle_outliving_messenger_is_inert() {
    let messenger = Messenger::new();
    let recorder = Recorder::shared("a", &Log::default());
    let subscription = messenger.subscribe(&recorder).unwrap();

    drop(messenger);

    assert!(!subscription.is_active());
    drop(subscription);
}

#[tokio::test]
async fn test_background_failures_reach_error_handler() {
    let handler = Arc::new(CountingHandler::default());
    let messenger = Messenger::new();
    messenger.set_error_handler(handler.clone());
    let failing = Arc::new(Failing);
    let _s = messenger.subscribe(&failing).unwrap();

    messenger.post(ExampleMessage::new("x")).await.unwrap();

    for _ in 0..100 {
        if handler.failures.load(Ordering::SeqCst) > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(handler.failures.load(Ordering::SeqCst), 1);
    assert_eq!(handler.subscribers.lock().unwrap().len(), 1);
}

#[derive(Default)]
struct Slow {
    active: AtomicUsize,
    max_active: AtomicUsize,
    calls: AtomicUsize,
}

#[async_trait]
impl Receive<ExampleMessage> for Slow {
    async fn receive(&self, _message: Arc<ExampleMessage>) -> Result<()> {
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.active.fetch_sub(1, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Subscriber for Slow {
    fn declare(registrations: &mut Registrations<Self>) {
        registrations.receive::<ExampleMessage>();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_deliveries_to_one_subscriber_never_overlap() {
    let messenger = Messenger::new();
    let slow = Arc::new(Slow::default());
    let _s = messenger.subscribe(&slow).unwrap();

    let publishes: Vec<_> = (0..3)
        .map(|i| {
            let messenger = messenger.clone();
            tokio::spawn(async move {
                messenger
                    .publish_and_wait(ExampleMessage::new(&format!("m{i}")))
                    .await
            })
        })
        .collect();
    for publish in publishes {
        publish.await.unwrap().unwrap();
    }

    assert_eq!(slow.calls.load(Ordering::SeqCst), 3);
    assert_eq!(slow.max_active.load(Ordering::SeqCst), 1);
}
