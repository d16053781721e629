use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use common::{CustomizationId, OrderId, ProductId, UserId};
use tokio::sync::RwLock;

use crate::catalog::{Customization, Product, ProductCategory};
use crate::order::{Order, OrderStatus};

use super::{CustomizationRepository, OrderRepository, ProductRepository, RepositoryError, Result};

/// In-memory product and customization store.
///
/// Backs tests and the default server runtime when no database is configured.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
    customizations: Arc<RwLock<HashMap<CustomizationId, Customization>>>,
}

impl InMemoryCatalog {
    /// Creates a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored products, active or not.
    pub async fn product_count(&self) -> usize {
        self.products.read().await.len()
    }

    /// Returns the number of stored customizations.
    pub async fn customization_count(&self) -> usize {
        self.customizations.read().await.len()
    }
}

#[async_trait]
impl ProductRepository for InMemoryCatalog {
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn find_active(&self, category: Option<ProductCategory>) -> Result<Vec<Product>> {
        let mut products: Vec<_> = self
            .products
            .read()
            .await
            .values()
            .filter(|p| p.is_active && category.is_none_or(|c| p.category == c))
            .cloned()
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    async fn save(&self, product: Product) -> Result<Product> {
        self.products
            .write()
            .await
            .insert(product.id, product.clone());
        Ok(product)
    }
}

#[async_trait]
impl CustomizationRepository for InMemoryCatalog {
    async fn find_by_id(&self, id: CustomizationId) -> Result<Option<Customization>> {
        Ok(self.customizations.read().await.get(&id).cloned())
    }

    async fn find_all(&self, product_id: Option<ProductId>) -> Result<Vec<Customization>> {
        let mut customizations: Vec<_> = self
            .customizations
            .read()
            .await
            .values()
            .filter(|c| product_id.is_none_or(|id| c.product_id == id))
            .cloned()
            .collect();
        customizations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(customizations)
    }

    async fn save(&self, customization: Customization) -> Result<Customization> {
        self.customizations
            .write()
            .await
            .insert(customization.id, customization.clone());
        Ok(customization)
    }

    async fn delete(&self, id: CustomizationId) -> Result<bool> {
        Ok(self.customizations.write().await.remove(&id).is_some())
    }
}

/// In-memory order store.
#[derive(Clone, Default)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
    fail_on_save: Arc<AtomicBool>,
}

impl InMemoryOrderRepository {
    /// Creates a new empty order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Makes every following save fail, to exercise backend error paths.
    pub fn set_fail_on_save(&self, fail: bool) {
        self.fail_on_save.store(fail, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.fail_on_save.load(Ordering::SeqCst) {
            return Err(RepositoryError::backend(std::io::Error::other(
                "order store unavailable",
            )));
        }
        Ok(())
    }

    fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
        orders.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        orders
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn save(&self, order: Order) -> Result<Order> {
        self.check_available()?;
        self.orders.write().await.insert(order.id(), order.clone());
        Ok(order)
    }

    async fn update_if_status(&self, order: Order, expected: OrderStatus) -> Result<Order> {
        self.check_available()?;
        let mut orders = self.orders.write().await;

        let order_id = order.id();
        match orders.get(&order_id) {
            Some(stored) if stored.status() == expected => {}
            _ => return Err(RepositoryError::ConcurrencyConflict { order_id, expected }),
        }

        orders.insert(order_id, order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Order>> {
        let orders = self
            .orders
            .read()
            .await
            .values()
            .filter(|o| o.user_id() == user_id)
            .cloned()
            .collect();
        Ok(Self::newest_first(orders))
    }

    async fn find_all(&self) -> Result<Vec<Order>> {
        let orders = self.orders.read().await.values().cloned().collect();
        Ok(Self::newest_first(orders))
    }
}
