//! Error types for the chat room client.

use chatroom_connection::{ConnectionError, ValidationError};
use thiserror::Error;

use crate::command::CommandError;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Server URL or room ID rejected
    #[error("Invalid setting: {0}")]
    Validation(#[from] ValidationError),

    /// Subscribing to the room failed
    #[error("Subscription failed: {0}")]
    Subscription(#[from] ConnectionError),

    /// Unparseable input line
    #[error("{0}")]
    Command(#[from] CommandError),
}
