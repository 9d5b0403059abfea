//! Error types for the simulated connection.

use thiserror::Error;

/// Misuse of a [`ChatConnection`](crate::ChatConnection).
///
/// Both variants are raised synchronously by `on` and are never retried
/// inside this crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// A handler is already registered on this connection
    #[error("Cannot add the handler twice.")]
    DuplicateHandler,

    /// Event name other than "message"
    #[error("Only \"message\" event is supported, got '{0}'")]
    UnsupportedEvent(String),
}

/// Value object validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Server URL must not be empty")]
    EmptyServerUrl,

    #[error("Room ID must not be empty")]
    EmptyRoomId,

    #[error("Canned message set must contain at least one message")]
    EmptyMessageSet,
}
