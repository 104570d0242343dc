//! Composition root
//!
//! Installs the built-in services into a [`ServiceContainer`] and exposes
//! them through [`AppContext`].
//!
//! ## Architecture
//!
//! ```text
//! AppConfig → DEFAULT_SERVICES (capability → constructor) → ServiceContainer
//!                                                               ↓
//!                                                          AppContext
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! let context = init_app(AppConfig::default())?;
//! let navigator = context.navigator();
//! navigator.navigate("/Settings").await?;
//! ```

use super::container::{ServiceContainer, ServiceContainerBuilder};
use crate::config::AppConfig;
use crate::dispatcher::ImmediateDispatcher;
use crate::messenger::Messenger;
use crate::navigation::{NavigationService, PageStack};
use crate::routing::RouteRegistry;
use crate::settings::{SettingsService, backend_from_config};
use std::sync::Arc;
use tracing::{debug, info};
use vmkit_domain::error::Result;
use vmkit_domain::ports::dispatcher::UiDispatcher;
use vmkit_domain::ports::navigation::{Navigator, PlatformNavigator};
use vmkit_domain::ports::routing::RouteTable;
use vmkit_domain::ports::settings::SettingsBackend;

/// Installs one built-in capability into a builder
pub type ServiceInstaller = fn(ServiceContainerBuilder, &Arc<AppConfig>) -> ServiceContainerBuilder;

/// Built-in capabilities and the constructors installing them
///
/// | Capability | Registered types |
/// |------------|------------------|
/// | `messenger` | `Messenger` |
/// | `routing` | `RouteRegistry`, `dyn RouteTable` |
/// | `platform` | `PageStack`, `dyn PlatformNavigator` |
/// | `navigation` | `NavigationService`, `dyn Navigator` |
/// | `settings` | `dyn SettingsBackend`, `SettingsService` |
/// | `dispatcher` | `dyn UiDispatcher` |
pub const DEFAULT_SERVICES: &[(&str, ServiceInstaller)] = &[
    ("messenger", install_messenger),
    ("routing", install_routing),
    ("platform", install_platform),
    ("navigation", install_navigation),
    ("settings", install_settings),
    ("dispatcher", install_dispatcher),
];

fn install_messenger(
    builder: ServiceContainerBuilder,
    config: &Arc<AppConfig>,
) -> ServiceContainerBuilder {
    let config = config.clone();
    builder.register_singleton::<Messenger, _>(move |_| {
        Ok(Arc::new(Messenger::from_config(&config.messenger)))
    })
}

fn install_routing(
    builder: ServiceContainerBuilder,
    _config: &Arc<AppConfig>,
) -> ServiceContainerBuilder {
    builder
        .register_singleton::<RouteRegistry, _>(|_| Ok(RouteRegistry::new_shared()))
        .register_singleton::<dyn RouteTable, _>(|container| {
            let routes: Arc<dyn RouteTable> = container.resolve::<RouteRegistry>()?;
            Ok(routes)
        })
}

fn install_platform(
    builder: ServiceContainerBuilder,
    _config: &Arc<AppConfig>,
) -> ServiceContainerBuilder {
    builder
        .register_singleton::<PageStack, _>(|_| Ok(Arc::new(PageStack::new())))
        .register_singleton::<dyn PlatformNavigator, _>(|container| {
            let platform: Arc<dyn PlatformNavigator> = container.resolve::<PageStack>()?;
            Ok(platform)
        })
}

fn install_navigation(
    builder: ServiceContainerBuilder,
    config: &Arc<AppConfig>,
) -> ServiceContainerBuilder {
    let config = config.clone();
    builder
        .register_singleton::<NavigationService, _>(move |container| {
            Ok(Arc::new(NavigationService::from_config(
                &config.navigation,
                container.resolve::<dyn RouteTable>()?,
                container.resolve::<dyn PlatformNavigator>()?,
            )))
        })
        .register_singleton::<dyn Navigator, _>(|container| {
            let navigator: Arc<dyn Navigator> = container.resolve::<NavigationService>()?;
            Ok(navigator)
        })
}

fn install_settings(
    builder: ServiceContainerBuilder,
    config: &Arc<AppConfig>,
) -> ServiceContainerBuilder {
    let config = config.clone();
    builder
        .register_singleton::<dyn SettingsBackend, _>(move |_| {
            Ok(backend_from_config(&config.settings))
        })
        .register_singleton::<SettingsService, _>(|container| {
            Ok(Arc::new(SettingsService::new(
                container.resolve::<dyn SettingsBackend>()?,
            )))
        })
}

fn install_dispatcher(
    builder: ServiceContainerBuilder,
    _config: &Arc<AppConfig>,
) -> ServiceContainerBuilder {
    builder.register_singleton::<dyn UiDispatcher, _>(|_| {
        let dispatcher: Arc<dyn UiDispatcher> = Arc::new(ImmediateDispatcher::new());
        Ok(dispatcher)
    })
}

impl ServiceContainerBuilder {
    /// Install every built-in service configured by `config`
    ///
    /// Also registers the configuration itself as `AppConfig`. Registrations
    /// made afterwards replace the defaults, so hosts can swap in their own
    /// platform navigator or dispatcher.
    pub fn with_defaults(self, config: &AppConfig) -> Self {
        let config = Arc::new(config.clone());
        let builder = self.register_instance(config.clone());
        DEFAULT_SERVICES
            .iter()
            .fold(builder, |builder, (capability, install)| {
                debug!("Installing default {} services", capability);
                install(builder, &config)
            })
    }
}

/// Application context: configuration plus the resolved built-in services
///
/// This is the composition root handed to view-models and hosts.
pub struct AppContext {
    /// Application configuration
    pub config: Arc<AppConfig>,
    container: Arc<ServiceContainer>,
    messenger: Arc<Messenger>,
    routes: Arc<RouteRegistry>,
    page_stack: Arc<PageStack>,
    navigator: Arc<dyn Navigator>,
    settings: Arc<SettingsService>,
    dispatcher: Arc<dyn UiDispatcher>,
}

impl AppContext {
    /// Resolve the built-in services from a container
    ///
    /// Fails with [`vmkit_domain::Error::MissingDependency`] if the container
    /// lacks any of them.
    pub fn from_container(container: ServiceContainer) -> Result<Self> {
        Ok(Self {
            config: container.resolve::<AppConfig>()?,
            messenger: container.resolve::<Messenger>()?,
            routes: container.resolve::<RouteRegistry>()?,
            page_stack: container.resolve::<PageStack>()?,
            navigator: container.resolve::<dyn Navigator>()?,
            settings: container.resolve::<SettingsService>()?,
            dispatcher: container.resolve::<dyn UiDispatcher>()?,
            container: Arc::new(container),
        })
    }

    /// Underlying container, for services registered by the host
    pub fn container(&self) -> Arc<ServiceContainer> {
        self.container.clone()
    }

    /// Get the messenger
    pub fn messenger(&self) -> Arc<Messenger> {
        self.messenger.clone()
    }

    /// Get the route registry
    pub fn routes(&self) -> Arc<RouteRegistry> {
        self.routes.clone()
    }

    /// Get the in-memory page stack
    pub fn page_stack(&self) -> Arc<PageStack> {
        self.page_stack.clone()
    }

    /// Get the navigation service
    pub fn navigator(&self) -> Arc<dyn Navigator> {
        self.navigator.clone()
    }

    /// Get the settings service
    pub fn settings(&self) -> Arc<SettingsService> {
        self.settings.clone()
    }

    /// Get the UI dispatcher
    pub fn dispatcher(&self) -> Arc<dyn UiDispatcher> {
        self.dispatcher.clone()
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("messenger", &self.messenger)
            .field("routes", &self.routes)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Initialize the application context with the built-in services
pub fn init_app(config: AppConfig) -> Result<AppContext> {
    info!("Initializing application context");
    let container = ServiceContainer::builder().with_defaults(&config).build();
    let context = AppContext::from_container(container)?;
    info!(
        "Application context ready: settings backend {}",
        context.settings.backend_name()
    );
    Ok(context)
}

/// Initialize an application context with in-memory settings
pub fn init_test_app() -> Result<AppContext> {
    let mut config = AppConfig::default();
    config.settings = crate::config::SettingsConfig::memory();
    init_app(config)
}
