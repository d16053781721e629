//! HTTP and WebSocket route handlers.

pub mod catalog;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod ws;

use std::str::FromStr;

use domain::{CatalogService, OrderService};
use hub::Hub;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
#[derive(Clone)]
pub struct AppState {
    pub order_service: OrderService,
    pub catalog_service: CatalogService,
    pub hub: Hub,
}

/// Parses an identifier from a path segment.
pub(crate) fn parse_id<T: FromStr>(kind: &str, raw: &str) -> Result<T, ApiError>
where
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid {kind} ID '{raw}': {e}")))
}
