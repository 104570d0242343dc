//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for vmkit services
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON parsing or serialization error
    #[error("JSON parsing error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// Invalid argument provided to a function
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument
        message: String,
    },

    /// A service was requested from the container but never registered
    #[error("Argument required: no registration for {dependency}")]
    MissingDependency {
        /// Type name of the missing dependency
        dependency: String,
    },

    /// A service factory (transitively) requested itself
    #[error("Dependency cycle detected while resolving {dependency}")]
    DependencyCycle {
        /// Type name at which the cycle closed
        dependency: String,
    },

    /// Navigation to a path with no registered route
    #[error("No route registered for path '{path}'")]
    RouteNotFound {
        /// The requested path
        path: String,
    },

    /// Platform navigation failure
    #[error("Navigation error: {message}")]
    Navigation {
        /// Description of the navigation failure
        message: String,
    },

    /// A stored value could not be converted to or from the requested type
    #[error("Serialization error: {message}")]
    Serialization {
        /// Description of the conversion failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A message handler panicked during delivery
    #[error("Handler {subscriber} panicked while receiving {message_type}: {panic}")]
    HandlerPanicked {
        /// Message type being delivered
        message_type: String,
        /// Subscriber type that panicked
        subscriber: String,
        /// Panic payload rendered as text
        panic: String,
    },

    /// Several message handlers failed during one publish
    #[error("{} message handlers failed", .errors.len())]
    Aggregate {
        /// Every re-raised handler error, in delivery order
        errors: Vec<Error>,
    },

    /// Invalid or unloadable configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },

    /// Infrastructure operation error
    #[error("Infrastructure error: {message}")]
    Infrastructure {
        /// Description of the infrastructure error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

// Basic error creation methods
impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

// Service resolution error creation methods
impl Error {
    /// Create a missing dependency error naming the unresolved type
    pub fn missing_dependency<S: Into<String>>(dependency: S) -> Self {
        Self::MissingDependency {
            dependency: dependency.into(),
        }
    }

    /// Create a dependency cycle error
    pub fn dependency_cycle<S: Into<String>>(dependency: S) -> Self {
        Self::DependencyCycle {
            dependency: dependency.into(),
        }
    }
}

// Navigation error creation methods
impl Error {
    /// Create a route not found error
    pub fn route_not_found<S: Into<String>>(path: S) -> Self {
        Self::RouteNotFound { path: path.into() }
    }

    /// Create a navigation error
    pub fn navigation<S: Into<String>>(message: S) -> Self {
        Self::Navigation {
            message: message.into(),
        }
    }
}

// Messaging error creation methods
impl Error {
    /// Create a handler panic error
    pub fn handler_panicked<M, S, P>(message_type: M, subscriber: S, panic: P) -> Self
    where
        M: Into<String>,
        S: Into<String>,
        P: Into<String>,
    {
        Self::HandlerPanicked {
            message_type: message_type.into(),
            subscriber: subscriber.into(),
            panic: panic.into(),
        }
    }

    /// Collapse a list of handler errors into a single result
    ///
    /// No errors is success, one error is returned as is, and several are
    /// wrapped in [`Error::Aggregate`].
    pub fn from_many(mut errors: Vec<Error>) -> Result<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(Self::Aggregate { errors }),
        }
    }
}

// Serialization error creation methods
impl Error {
    /// Create a serialization error
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        Self::Serialization {
            message: message.into(),
            source: None,
        }
    }

    /// Create a serialization error with source
    pub fn serialization_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Serialization {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// I/O error creation methods
impl Error {
    /// Create an I/O error with source
    pub fn io_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Configuration error creation methods
impl Error {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn config_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
