//! Event layer errors.
//!
//! | Error | Code | Recoverable |
//! |-------|------|-------------|
//! | [`EventError::SubscriberFailed`] | `EVENT_SUBSCRIBER_FAILED` | No |
//! | [`EventError::Priority`] | forwarded `PRIORITY_*` code | No |

use crate::SubscriberError;
use nodula_types::{ErrorCode, Priority, PriorityError};
use thiserror::Error;

/// Event layer error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// A subscriber returned an error; the rest of that dispatch was
    /// abandoned.
    #[error("subscriber of '{event}' failed at priority {priority}: {source}")]
    SubscriberFailed {
        /// Name of the event being triggered.
        event: String,
        /// Priority the failing subscriber was registered at.
        priority: Priority,
        /// Error returned by the subscriber.
        source: SubscriberError,
    },

    /// Priority lookup failed while preparing a registration.
    #[error(transparent)]
    Priority(#[from] PriorityError),
}

impl ErrorCode for EventError {
    fn code(&self) -> &'static str {
        match self {
            Self::SubscriberFailed { .. } => "EVENT_SUBSCRIBER_FAILED",
            Self::Priority(err) => err.code(),
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::SubscriberFailed { .. } => false,
            Self::Priority(err) => err.is_recoverable(),
        }
    }
}
