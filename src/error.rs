//! Error types.
//!
//! All failures are local, synchronous precondition violations. The
//! driver is expected to fix the call rather than retry it.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, QueueError>;

/// Errors raised by the list, the clients and the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// Negative demand or quantity, zero quantum, malformed client,
    /// missing admission key or an inconsistent configuration.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Position outside `[0, len)`, or `[0, len]` for insertion.
    #[error("position {pos} out of range for length {len}")]
    OutOfRange { pos: usize, len: usize },

    /// Identity-based lookup miss.
    #[error("element not found")]
    NotFound,

    /// `serve` called with no client waiting.
    #[error("no client to serve")]
    EmptyService,
}

impl QueueError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}
