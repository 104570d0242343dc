//! # vmkit Domain
//!
//! Core types shared by every vmkit layer: the error type, value objects
//! and the port traits that infrastructure implements.
//!
//! ## Modules
//!
//! - [`error`] - [`Error`] enum and [`Result`] alias
//! - [`ports`] - Service contracts (messenger, routing, navigation, settings, dispatcher)
//! - [`value_objects`] - Navigation requests and property notifications

pub mod error;
pub mod ports;
pub mod value_objects;

pub use error::{Error, Result};
pub use value_objects::{NavigationRequest, PropertyChanged};
