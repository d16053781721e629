//! Domain error types.

use common::{CustomizationId, Money, OrderId, ProductId};
use thiserror::Error;

use crate::order::OrderStatus;
use crate::repository::RepositoryError;

/// Errors that can occur during catalog and order operations.
///
/// Pricing and state machine failures reach the caller as-is; the order
/// service never wraps them.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Referenced product does not exist or is inactive.
    #[error("Product with ID {product_id} not found")]
    ProductNotFound { product_id: ProductId },

    /// Referenced customization does not exist.
    #[error("Customization with ID {customization_id} not found")]
    CustomizationNotFound { customization_id: CustomizationId },

    /// No order with the given ID.
    #[error("Order with ID {order_id} not found")]
    OrderNotFound { order_id: OrderId },

    /// The requested status is not reachable from the current one.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// A status string that names no known order status.
    #[error("Unknown order status: {0}")]
    UnknownStatus(String),

    /// A line item with a zero quantity.
    #[error("Invalid quantity for product {product_id}: {quantity} (must be greater than 0)")]
    InvalidQuantity { product_id: ProductId, quantity: u32 },

    /// A customization quantity the catalog cannot store.
    #[error("Invalid customization quantity: {quantity} (must be at most {max})")]
    QuantityTooLarge { quantity: u32, max: u32 },

    /// A product price below zero.
    #[error("Invalid price {price} (must not be negative)")]
    NegativePrice { price: Money },

    /// A line total, subtotal or total does not fit in a money amount.
    #[error("Order amount exceeds the supported range{}", overflow_scope(.product_id))]
    AmountOverflow { product_id: Option<ProductId> },

    /// Another writer changed the order status after it was read.
    #[error("Order {order_id} was modified concurrently (expected status {expected})")]
    ConcurrencyConflict {
        order_id: OrderId,
        expected: OrderStatus,
    },

    /// The storage backend failed.
    #[error("Repository error: {0}")]
    Repository(#[source] RepositoryError),
}

fn overflow_scope(product_id: &Option<ProductId>) -> String {
    product_id
        .map(|id| format!(" for product {id}"))
        .unwrap_or_default()
}

impl From<RepositoryError> for DomainError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::ConcurrencyConflict { order_id, expected } => {
                DomainError::ConcurrencyConflict { order_id, expected }
            }
            other => DomainError::Repository(other),
        }
    }
}

impl DomainError {
    /// Short machine-readable name of the error kind, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::ProductNotFound { .. } => "product_not_found",
            DomainError::CustomizationNotFound { .. } => "customization_not_found",
            DomainError::OrderNotFound { .. } => "order_not_found",
            DomainError::InvalidTransition { .. } => "invalid_transition",
            DomainError::UnknownStatus(_) => "unknown_status",
            DomainError::InvalidQuantity { .. } => "invalid_quantity",
            DomainError::QuantityTooLarge { .. } => "quantity_too_large",
            DomainError::NegativePrice { .. } => "negative_price",
            DomainError::AmountOverflow { .. } => "amount_overflow",
            DomainError::ConcurrencyConflict { .. } => "concurrency_conflict",
            DomainError::Repository(_) => "repository",
        }
    }
}
