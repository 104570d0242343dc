//! UI dispatchers
//!
//! | Dispatcher | UI context | Use |
//! |------------|------------|-----|
//! | [`ImmediateDispatcher`] | every thread | Headless hosts and tests |
//! | [`QueueDispatcher`] | creating thread | Hosts with their own UI loop |

use crate::constants::DISPATCHER_MAX_BATCH;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::thread::{self, ThreadId};
use tokio::sync::Notify;
use tracing::trace;
use vmkit_domain::error::{Error, Result};
use vmkit_domain::ports::dispatcher::{DispatchJob, UiDispatcher};

/// Dispatcher that runs every job inline on the calling thread
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateDispatcher;

impl ImmediateDispatcher {
    /// Create an immediate dispatcher
    pub fn new() -> Self {
        Self
    }
}

impl UiDispatcher for ImmediateDispatcher {
    fn has_access(&self) -> bool {
        true
    }

    fn dispatch(&self, job: DispatchJob) {
        job();
    }
}

/// Dispatcher owned by one thread that drains queued work
///
/// Jobs dispatched from any thread wait in a FIFO queue until the owning
/// thread calls [`QueueDispatcher::run_pending`].
pub struct QueueDispatcher {
    owner: ThreadId,
    queue: Mutex<VecDeque<DispatchJob>>,
    work_available: Notify,
}

impl QueueDispatcher {
    /// Create a dispatcher owned by the current thread
    pub fn for_current_thread() -> Self {
        Self {
            owner: thread::current().id(),
            queue: Mutex::new(VecDeque::new()),
            work_available: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<DispatchJob>> {
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of queued jobs
    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    /// Run queued jobs in order, returning how many ran
    ///
    /// Jobs queued while draining run in the same call, up to a batch
    /// limit. Only the owning thread may drain the queue.
    pub fn run_pending(&self) -> Result<usize> {
        if !self.has_access() {
            return Err(Error::internal(
                "QueueDispatcher::run_pending called off the UI thread",
            ));
        }
        let mut ran = 0;
        while ran < DISPATCHER_MAX_BATCH {
            // Release the lock before running so jobs can dispatch more work
            let Some(job) = self.lock().pop_front() else {
                break;
            };
            job();
            ran += 1;
        }
        trace!(ran, "Drained dispatcher queue");
        Ok(ran)
    }

    /// Wait until work is dispatched
    ///
    /// Returns only while the queue is non-empty; a wakeup left over from
    /// work already drained is ignored.
    pub async fn work_available(&self) {
        loop {
            let notified = self.work_available.notified();
            if self.pending() > 0 {
                return;
            }
            notified.await;
        }
    }
}

impl UiDispatcher for QueueDispatcher {
    fn has_access(&self) -> bool {
        thread::current().id() == self.owner
    }

    fn dispatch(&self, job: DispatchJob) {
        self.lock().push_back(job);
        self.work_available.notify_one();
    }
}

impl std::fmt::Debug for QueueDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueDispatcher")
            .field("owner", &self.owner)
            .field("pending", &self.pending())
            .finish()
    }
}
