//! Navigation Infrastructure
//!
//! ## Components
//!
//! - [`NavigationService`] - Resolves paths through the route table
//! - [`PageStack`] - In-memory platform back stack for headless hosts

mod page_stack;
mod service;

pub use page_stack::PageStack;
pub use service::NavigationService;
