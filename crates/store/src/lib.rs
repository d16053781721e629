//! PostgreSQL implementations of the domain repository ports.

pub mod catalog;
pub mod error;
pub mod orders;

pub use catalog::PostgresCatalog;
pub use error::{Result, StoreError};
pub use orders::PostgresOrderRepository;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Connects to PostgreSQL with a bounded pool.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Runs the embedded schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}

/// Decodes a string column through the type's serde representation.
pub(crate) fn decode_text<T: serde::de::DeserializeOwned>(value: String) -> Result<T> {
    Ok(serde_json::from_value(serde_json::Value::String(value))?)
}

pub(crate) fn decode_quantity(column: &'static str, value: i32) -> Result<u32> {
    u32::try_from(value).map_err(|e| StoreError::InvalidColumn {
        column,
        reason: e.to_string(),
    })
}

pub(crate) fn encode_quantity(column: &'static str, value: u32) -> Result<i32> {
    i32::try_from(value).map_err(|e| StoreError::InvalidColumn {
        column,
        reason: e.to_string(),
    })
}
