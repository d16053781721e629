//! Persistence ports consumed by the catalog and order services.
//!
//! Implementations must be thread-safe (Send + Sync) and provide atomic
//! per-record reads and writes; the services never need cross-record
//! transactions.

mod memory;

pub use memory::{InMemoryCatalog, InMemoryOrderRepository};

use async_trait::async_trait;
use common::{CustomizationId, OrderId, ProductId, UserId};
use thiserror::Error;

use crate::catalog::{Customization, Product, ProductCategory};
use crate::order::{Order, OrderStatus};

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The backend failed to serve the request.
    #[error("Storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A stored record could not be decoded.
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// A conditional write found the order in another status than expected.
    #[error("Concurrency conflict on order {order_id}: expected status {expected}")]
    ConcurrencyConflict {
        order_id: OrderId,
        expected: OrderStatus,
    },
}

impl RepositoryError {
    /// Wraps any backend error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        RepositoryError::Backend(Box::new(err))
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Read/write access to catalog products.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Finds a product regardless of its active flag.
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>>;

    /// Finds a product only if it is active.
    async fn find_active_by_id(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.find_by_id(id).await?.filter(|p| p.is_active))
    }

    /// Returns active products, newest first, optionally of one category.
    async fn find_active(&self, category: Option<ProductCategory>) -> Result<Vec<Product>>;

    /// Inserts or replaces a product.
    async fn save(&self, product: Product) -> Result<Product>;
}

/// Read/write access to product customizations.
#[async_trait]
pub trait CustomizationRepository: Send + Sync {
    /// Finds a customization by ID.
    async fn find_by_id(&self, id: CustomizationId) -> Result<Option<Customization>>;

    /// Returns customizations, newest first, optionally of one product.
    async fn find_all(&self, product_id: Option<ProductId>) -> Result<Vec<Customization>>;

    /// Inserts or replaces a customization.
    async fn save(&self, customization: Customization) -> Result<Customization>;

    /// Deletes a customization. Returns false if it did not exist.
    async fn delete(&self, id: CustomizationId) -> Result<bool>;
}

/// Read/write access to orders.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Inserts a new order.
    async fn save(&self, order: Order) -> Result<Order>;

    /// Writes the status of an existing order, but only while its stored
    /// status still equals `expected`.
    ///
    /// Fails with [`RepositoryError::ConcurrencyConflict`] otherwise, which
    /// includes the case of an order that is no longer stored.
    async fn update_if_status(&self, order: Order, expected: OrderStatus) -> Result<Order>;

    /// Finds an order by ID.
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>>;

    /// Returns all orders of a user, newest first.
    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Order>>;

    /// Returns all orders, newest first.
    async fn find_all(&self) -> Result<Vec<Order>>;
}
