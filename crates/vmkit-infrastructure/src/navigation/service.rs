//! Navigation service implementation

use crate::config::NavigationConfig;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};
use vmkit_domain::error::{Error, Result};
use vmkit_domain::ports::navigation::{Navigator, PlatformNavigator};
use vmkit_domain::ports::routing::RouteTable;

/// Navigation through the route table
///
/// Holds no page state: each `navigate` call resolves its path afresh and
/// back navigation is delegated to the platform.
pub struct NavigationService {
    routes: Arc<dyn RouteTable>,
    platform: Arc<dyn PlatformNavigator>,
    ignore_unknown_routes: bool,
}

impl NavigationService {
    /// Create a service that fails on unregistered paths
    pub fn new(routes: Arc<dyn RouteTable>, platform: Arc<dyn PlatformNavigator>) -> Self {
        Self {
            routes,
            platform,
            ignore_unknown_routes: false,
        }
    }

    /// Create a service honouring the navigation configuration
    pub fn from_config(
        config: &NavigationConfig,
        routes: Arc<dyn RouteTable>,
        platform: Arc<dyn PlatformNavigator>,
    ) -> Self {
        Self {
            ignore_unknown_routes: config.ignore_unknown_routes,
            ..Self::new(routes, platform)
        }
    }

    /// Route table used for resolution
    pub fn routes(&self) -> Arc<dyn RouteTable> {
        self.routes.clone()
    }
}

#[async_trait]
impl Navigator for NavigationService {
    async fn navigate(&self, path: &str) -> Result<()> {
        let Some(action) = self.routes.resolve(path) else {
            if self.ignore_unknown_routes {
                warn!(path, "Ignoring navigation to unregistered path");
                return Ok(());
            }
            return Err(Error::route_not_found(path));
        };
        debug!(path, "Navigating");
        action.invoke().await
    }

    async fn go_back(&self) -> Result<bool> {
        let went_back = self.platform.go_back().await?;
        debug!(went_back, "Back navigation");
        Ok(went_back)
    }

    fn can_go_back(&self) -> bool {
        self.platform.can_go_back()
    }
}

impl std::fmt::Debug for NavigationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationService")
            .field("paths", &self.routes.paths())
            .field("ignore_unknown_routes", &self.ignore_unknown_routes)
            .finish()
    }
}
