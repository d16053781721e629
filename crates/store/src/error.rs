use common::OrderId;
use domain::{OrderStatus, RepositoryError};
use thiserror::Error;

/// Errors raised by the PostgreSQL repositories.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored value could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A column held a value outside its domain range.
    #[error("Invalid column {column}: {reason}")]
    InvalidColumn { column: &'static str, reason: String },

    /// A conditional status update matched no row.
    #[error("Order {order_id} is no longer in status {expected}")]
    ConcurrencyConflict {
        order_id: OrderId,
        expected: OrderStatus,
    },
}

impl From<StoreError> for RepositoryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Serialization(_) | StoreError::InvalidColumn { .. } => {
                RepositoryError::Corrupt(err.to_string())
            }
            StoreError::ConcurrencyConflict { order_id, expected } => {
                RepositoryError::ConcurrencyConflict { order_id, expected }
            }
            other => RepositoryError::backend(other),
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
