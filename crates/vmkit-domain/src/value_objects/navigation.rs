//! Navigation request value object

use serde::{Deserialize, Serialize};
use std::fmt;

/// A request to move between pages
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationRequest {
    /// Navigate to the page registered for this path
    Path(String),
    /// Return to the previous page
    Back,
}

impl NavigationRequest {
    /// Request for a registered path
    pub fn path(path: impl Into<String>) -> Self {
        Self::Path(path.into())
    }

    /// Whether this is a back request
    pub fn is_back(&self) -> bool {
        matches!(self, Self::Back)
    }
}

impl fmt::Display for NavigationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "navigate({path})"),
            Self::Back => f.write_str("back"),
        }
    }
}
