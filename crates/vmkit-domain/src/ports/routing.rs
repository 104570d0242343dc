//! Route Table Port
//!
//! Defines the contract for mapping opaque path strings to navigation
//! actions. Paths are registered during application configuration and
//! resolved by the navigation service.

use crate::error::Result;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Future returned by a route action
pub type ActionFuture = BoxFuture<'static, Result<()>>;

type ActionFn = dyn Fn() -> ActionFuture + Send + Sync;

/// Zero-argument operation performing a platform page transition
///
/// Cloning shares the underlying action; equality is identity, so a clone
/// compares equal to its original and to nothing else.
#[derive(Clone)]
pub struct RouteAction {
    inner: Arc<ActionFn>,
}

impl RouteAction {
    /// Wrap a synchronous action
    pub fn new<F>(action: F) -> Self
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(move || futures::future::ready(action()).boxed()),
        }
    }

    /// Wrap an asynchronous action
    pub fn from_async<F, Fut>(action: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            inner: Arc::new(move || action().boxed()),
        }
    }

    /// Run the action
    pub async fn invoke(&self) -> Result<()> {
        (self.inner)().await
    }

    /// Whether both handles refer to the same registered action
    pub fn same_as(&self, other: &RouteAction) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.inner), Arc::as_ptr(&other.inner))
    }
}

impl PartialEq for RouteAction {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl Eq for RouteAction {}

impl fmt::Debug for RouteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteAction")
            .field("ptr", &Arc::as_ptr(&self.inner).cast::<()>())
            .finish()
    }
}

/// Route table interface
///
/// Implementations must tolerate registration and resolution from
/// different threads.
pub trait RouteTable: Send + Sync {
    /// Insert or replace the action for `path`
    fn register_path(&self, path: &str, action: RouteAction) -> Result<()>;

    /// Look up the action for `path`; `None` means no route is registered
    fn resolve(&self, path: &str) -> Option<RouteAction>;

    /// Remove the route for `path`, reporting whether one existed
    fn unregister_path(&self, path: &str) -> bool;

    /// All registered paths in lexical order
    fn paths(&self) -> Vec<String>;
}
