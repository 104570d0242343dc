//! UI dispatcher tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use vmkit_domain::ports::dispatcher::UiDispatcher;
use vmkit_infrastructure::dispatcher::{ImmediateDispatcher, QueueDispatcher};

#[test]
fn test_immediate_dispatcher_runs_inline() {
    let dispatcher = ImmediateDispatcher::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    assert!(dispatcher.has_access());
    dispatcher.dispatch(Box::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_queue_dispatcher_defers_until_pumped() {
    let dispatcher = QueueDispatcher::for_current_thread();
    let order = Arc::new(Mutex::new(Vec::new()));

    for i in 0..3 {
        let order = order.clone();
        dispatcher.dispatch(Box::new(move || order.lock().unwrap().push(i)));
    }
    assert_eq!(dispatcher.pending(), 3);
    assert!(order.lock().unwrap().is_empty());

    assert_eq!(dispatcher.run_pending().unwrap(), 3);
    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    assert_eq!(dispatcher.pending(), 0);
}

#[test]
fn test_queue_dispatcher_runs_inline_on_owner_thread() {
    let dispatcher = QueueDispatcher::for_current_thread();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    dispatcher.run_or_dispatch(Box::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(dispatcher.pending(), 0);
}

#[test]
fn test_queue_dispatcher_queues_from_other_threads() {
    let dispatcher = Arc::new(QueueDispatcher::for_current_thread());
    let calls = Arc::new(AtomicUsize::new(0));

    let remote = dispatcher.clone();
    let counter = calls.clone();
    std::thread::spawn(move || {
        assert!(!remote.has_access());
        remote.run_or_dispatch(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        assert!(remote.run_pending().is_err());
    })
    .join()
    .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(dispatcher.run_pending().unwrap(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_jobs_dispatched_while_draining_run_in_same_pass() {
    let dispatcher = Arc::new(QueueDispatcher::for_current_thread());
    let calls = Arc::new(AtomicUsize::new(0));

    let inner = dispatcher.clone();
    let counter = calls.clone();
    dispatcher.dispatch(Box::new(move || {
        let counter = counter.clone();
        inner.dispatch(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
    }));

    assert_eq!(dispatcher.run_pending().unwrap(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_work_available_wakes_on_dispatch() {
    let dispatcher = QueueDispatcher::for_current_thread();
    dispatcher.dispatch(Box::new(|| {}));

    dispatcher.work_available().await;
    assert_eq!(dispatcher.pending(), 1);
}

#[tokio::test]
async fn test_work_available_waits_after_queue_drained() {
    let dispatcher = QueueDispatcher::for_current_thread();
    dispatcher.dispatch(Box::new(|| {}));
    assert_eq!(dispatcher.run_pending().unwrap(), 1);

    let waited = tokio::time::timeout(Duration::from_millis(50), dispatcher.work_available()).await;
    assert!(waited.is_err());

    dispatcher.dispatch(Box::new(|| {}));
    dispatcher.work_available().await;
    assert_eq!(dispatcher.pending(), 1);
}
