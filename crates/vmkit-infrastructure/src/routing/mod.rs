//! Route Table Infrastructure
//!
//! Maps opaque path strings to navigation actions.
//!
//! ## Components
//!
//! - [`RouteRegistry`] - Read/write guarded path table
//!
//! ## Usage
//!
//! ```ignore
//! let routes = RouteRegistry::new();
//! routes.register_path("/Page2", RouteAction::new(move || pages.push("Page2")))?;
//! let action = routes.resolve("/Page2");
//! ```

mod registry;

pub use registry::RouteRegistry;
