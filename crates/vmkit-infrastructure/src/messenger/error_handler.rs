//! Handler failure policies
//!
//! | Handler | Logs at | Re-raises |
//! |---------|---------|-----------|
//! | [`LoggingErrorHandler`] | error | yes |
//! | [`SilentErrorHandler`] | warn | no |

use crate::config::ErrorPolicy;
use std::sync::Arc;
use tracing::{error, warn};
use vmkit_domain::error::Error;
use vmkit_domain::ports::messenger::{DeliveryContext, MessengerErrorHandler};

/// Default handler: log the failure, then re-raise it to the publisher
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingErrorHandler;

impl MessengerErrorHandler for LoggingErrorHandler {
    fn handle(&self, err: Error, context: &DeliveryContext) -> Option<Error> {
        error!(
            message_type = context.message_type,
            subscriber = context.subscriber,
            error = %err,
            "Message handler failed"
        );
        Some(err)
    }
}

/// Log the failure and swallow it
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentErrorHandler;

impl MessengerErrorHandler for SilentErrorHandler {
    fn handle(&self, err: Error, context: &DeliveryContext) -> Option<Error> {
        warn!(
            message_type = context.message_type,
            subscriber = context.subscriber,
            error = %err,
            "Message handler failed, error swallowed"
        );
        None
    }
}

/// Handler implementing a configured policy
pub fn handler_for_policy(policy: ErrorPolicy) -> Arc<dyn MessengerErrorHandler> {
    match policy {
        ErrorPolicy::Propagate => Arc::new(LoggingErrorHandler),
        ErrorPolicy::LogOnly => Arc::new(SilentErrorHandler),
    }
}
