//! Service container
//!
//! A dill [`Catalog`] keyed by service type (concrete or `dyn Trait`). Each
//! registration is stored in the catalog as a typed [`Binding`] describing
//! how the shared instance is obtained. Built once through
//! [`ServiceContainerBuilder`] and passed explicitly; there is no global
//! lookup.
//!
//! ## Architecture
//!
//! ```text
//! register_*::<T>()  →  Binding<T>  →  CatalogBuilder::add_value(binding)
//!                                             ↓
//! resolve::<T>()     ←  Provider<T> ←  Catalog::get_one::<Binding<T>>()
//! ```
//!
//! ## Lifetimes
//!
//! | Registration | Built | Shared |
//! |--------------|-------|--------|
//! | instance | by the caller | always the given `Arc` |
//! | singleton | lazily, on first resolve | cached for the container's life |
//! | transient | on every resolve | never |

use dill::{Catalog, CatalogBuilder, InjectionError};
use std::any::{TypeId, type_name};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};
use vmkit_domain::error::{Error, Result};

type Factory<T> = Box<dyn Fn(&ServiceContainer) -> Result<Arc<T>> + Send + Sync>;

enum Provider<T: ?Sized> {
    Instance(Arc<T>),
    Singleton {
        factory: Factory<T>,
        cell: OnceLock<Arc<T>>,
    },
    Transient(Factory<T>),
}

impl<T: ?Sized> Provider<T> {
    fn kind(&self) -> &'static str {
        match self {
            Self::Instance(_) => "instance",
            Self::Singleton { .. } => "singleton",
            Self::Transient(_) => "transient",
        }
    }
}

/// Catalog value describing how to obtain the service `T`
struct Binding<T: ?Sized> {
    provider: Provider<T>,
}

/// Registration waiting to be added to the catalog
struct Staged {
    type_name: &'static str,
    install: Box<dyn FnOnce(&mut CatalogBuilder)>,
}

thread_local! {
    /// (container address, service type) pairs currently being built
    static RESOLVING: RefCell<Vec<(usize, TypeId)>> = const { RefCell::new(Vec::new()) };
}

/// Marks a service as under construction on this thread
struct ResolveGuard {
    frame: (usize, TypeId),
}

impl ResolveGuard {
    fn enter(frame: (usize, TypeId), type_name: &'static str) -> Result<Self> {
        RESOLVING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.contains(&frame) {
                return Err(Error::dependency_cycle(type_name));
            }
            stack.push(frame);
            Ok(Self { frame })
        })
    }
}

impl Drop for ResolveGuard {
    fn drop(&mut self) {
        RESOLVING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(position) = stack.iter().rposition(|frame| *frame == self.frame) {
                stack.remove(position);
            }
        });
    }
}

/// Map a catalog lookup failure for `T` onto the domain error
fn injection_error<T: ?Sized>(err: InjectionError) -> Error {
    match err {
        InjectionError::Unregistered(_) => Error::missing_dependency(type_name::<T>()),
        other => Error::internal(format!("Failed to resolve {}: {other}", type_name::<T>())),
    }
}

/// Builder collecting registrations for a [`ServiceContainer`]
///
/// Registering a type again replaces the earlier registration, so the
/// catalog never holds two bindings for one type.
#[derive(Default)]
pub struct ServiceContainerBuilder {
    registrations: HashMap<TypeId, Staged>,
}

impl ServiceContainerBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    fn insert<T>(mut self, provider: Provider<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let kind = provider.kind();
        let binding = Binding { provider };
        let previous = self.registrations.insert(
            TypeId::of::<T>(),
            Staged {
                type_name: type_name::<T>(),
                install: Box::new(move |catalog: &mut CatalogBuilder| {
                    catalog.add_value(binding);
                }),
            },
        );
        if previous.is_some() {
            debug!("Replaced registration for {} with {}", type_name::<T>(), kind);
        } else {
            debug!("Registered {} as {}", type_name::<T>(), kind);
        }
        self
    }

    /// Register an already built service
    pub fn register_instance<T>(self, instance: Arc<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.insert::<T>(Provider::Instance(instance))
    }

    /// Register a service built on first resolve and shared afterwards
    pub fn register_singleton<T, F>(self, factory: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceContainer) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        self.insert::<T>(Provider::Singleton {
            factory: Box::new(factory),
            cell: OnceLock::new(),
        })
    }

    /// Register a service built anew on every resolve
    pub fn register_transient<T, F>(self, factory: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceContainer) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        self.insert::<T>(Provider::Transient(Box::new(factory)))
    }

    /// Number of registrations so far
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Whether nothing has been registered
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Build the dill catalog and wrap it in a container
    pub fn build(self) -> ServiceContainer {
        let mut catalog = CatalogBuilder::new();
        let mut registered = Vec::with_capacity(self.registrations.len());
        for staged in self.registrations.into_values() {
            registered.push(staged.type_name);
            (staged.install)(&mut catalog);
        }
        registered.sort_unstable();
        debug!("Built service container with {} registrations", registered.len());

        ServiceContainer {
            catalog: catalog.build(),
            registered,
        }
    }
}

impl std::fmt::Debug for ServiceContainerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContainerBuilder")
            .field("registrations", &self.registrations.len())
            .finish()
    }
}

/// Resolves registered services by type
pub struct ServiceContainer {
    catalog: Catalog,
    registered: Vec<&'static str>,
}

impl ServiceContainer {
    /// Start building a container
    pub fn builder() -> ServiceContainerBuilder {
        ServiceContainerBuilder::new()
    }

    fn binding<T>(&self) -> Result<Arc<Binding<T>>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.catalog
            .get_one::<Binding<T>>()
            .map_err(injection_error::<T>)
    }

    /// Resolve the service registered for `T`
    ///
    /// # Errors
    ///
    /// - [`Error::MissingDependency`] naming `T` when nothing is registered
    /// - [`Error::DependencyCycle`] when `T`'s factory needs `T` itself
    /// - any error returned by a factory
    pub fn resolve<T>(&self) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let binding = self.binding::<T>()?;
        match &binding.provider {
            Provider::Instance(instance) => Ok(instance.clone()),
            Provider::Singleton { factory, cell } => {
                if let Some(service) = cell.get() {
                    return Ok(service.clone());
                }
                let built = self.build_with(factory)?;
                // A concurrent first resolve may have won; every caller gets the cached one
                Ok(cell.get_or_init(|| built).clone())
            }
            Provider::Transient(factory) => self.build_with(factory),
        }
    }

    /// Resolve `T`, or `None` when it is unavailable
    ///
    /// A failing factory also yields `None`; the failure is logged.
    pub fn try_resolve<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        if !self.contains::<T>() {
            return None;
        }
        match self.resolve::<T>() {
            Ok(service) => Some(service),
            Err(e) => {
                warn!("Failed to build {}: {}", type_name::<T>(), e);
                None
            }
        }
    }

    fn build_with<T>(&self, factory: &Factory<T>) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let container = std::ptr::from_ref(self) as usize;
        let _guard = ResolveGuard::enter((container, TypeId::of::<T>()), type_name::<T>())?;
        debug!("Building {}", type_name::<T>());
        factory(self)
    }

    /// Whether `T` is registered
    pub fn contains<T>(&self) -> bool
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.binding::<T>().is_ok()
    }

    /// Type names of every registration, sorted
    pub fn registered(&self) -> Vec<&'static str> {
        self.registered.clone()
    }

    /// Number of registrations
    pub fn len(&self) -> usize {
        self.registered.len()
    }

    /// Whether the container is empty
    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }
}

impl std::fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContainer")
            .field("registered", &self.registered)
            .finish_non_exhaustive()
    }
}
