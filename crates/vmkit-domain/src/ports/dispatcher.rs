//! UI Dispatcher Port
//!
//! A single execution context owns the UI. Work that touches UI-bound
//! state is handed to the dispatcher instead of running on the caller's
//! thread.

/// Unit of work marshalled onto the UI context
pub type DispatchJob = Box<dyn FnOnce() + Send + 'static>;

/// UI execution context
pub trait UiDispatcher: Send + Sync {
    /// Whether the calling thread is the UI context
    fn has_access(&self) -> bool;

    /// Queue `job` to run on the UI context
    fn dispatch(&self, job: DispatchJob);

    /// Run `job` inline on the UI context, otherwise queue it
    fn run_or_dispatch(&self, job: DispatchJob) {
        if self.has_access() {
            job();
        } else {
            self.dispatch(job);
        }
    }
}
