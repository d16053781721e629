//! Hub error types.

use thiserror::Error;

use crate::ConnectionId;

/// Errors that can occur during hub operations.
#[derive(Debug, Error)]
pub enum HubError {
    /// The connection is not (or no longer) registered.
    #[error("Unknown connection: {0}")]
    UnknownConnection(ConnectionId),

    /// Failed to serialize an outbound payload.
    #[error("Payload serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for hub operations.
pub type Result<T> = std::result::Result<T, HubError>;
