//! Property change notification

use serde::{Deserialize, Serialize};

/// Raised by a view-model after one of its properties changed value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyChanged {
    /// Name of the property that changed
    pub property: String,
}

impl PropertyChanged {
    /// Notification for `property`
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
        }
    }
}
