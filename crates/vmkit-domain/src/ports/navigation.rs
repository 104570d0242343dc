//! Navigation Ports
//!
//! [`Navigator`] is what view-models call; [`PlatformNavigator`] is what a
//! front end implements to perform the actual page transitions that the
//! route table cannot express, such as popping the current page.

use crate::error::Result;
use crate::value_objects::NavigationRequest;
use async_trait::async_trait;

/// Platform presentation layer owning the page history
#[async_trait]
pub trait PlatformNavigator: Send + Sync {
    /// Pop the current page; `false` when there is nothing to go back to
    async fn go_back(&self) -> Result<bool>;

    /// Whether a back transition is currently possible
    fn can_go_back(&self) -> bool;
}

/// Navigation service interface
#[async_trait]
pub trait Navigator: Send + Sync {
    /// Navigate to the page registered for `path`
    async fn navigate(&self, path: &str) -> Result<()>;

    /// Return to the previous page without consulting the route table
    async fn go_back(&self) -> Result<bool>;

    /// Whether a back transition is currently possible
    fn can_go_back(&self) -> bool;

    /// Execute a navigation request of either form
    async fn request(&self, request: NavigationRequest) -> Result<()> {
        match request {
            NavigationRequest::Path(path) => self.navigate(&path).await,
            NavigationRequest::Back => self.go_back().await.map(|_| ()),
        }
    }
}
