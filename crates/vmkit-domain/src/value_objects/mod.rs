//! Value Objects
//!
//! Small immutable types passed between view-models and services.

mod navigation;
mod property;

pub use navigation::NavigationRequest;
pub use property::PropertyChanged;
