//! Order service: the single entry point for order writes and queries.

use std::sync::Arc;

use chrono::Utc;
use common::{OrderId, UserId};

use crate::error::DomainError;
use crate::repository::OrderRepository;
use crate::sink::EventSink;

use super::{CreateOrderRequest, Order, OrderEvent, OrderStatus, OrderSummary, PricingEngine};

/// Service for managing orders.
///
/// Orchestrates pricing, the status state machine, persistence and event
/// publication. Errors from pricing and the state machine are returned to the
/// caller unchanged, and nothing is published for a failed operation.
#[derive(Clone)]
pub struct OrderService {
    pricing: PricingEngine,
    orders: Arc<dyn OrderRepository>,
    sink: Arc<dyn EventSink>,
}

impl OrderService {
    /// Creates a new order service.
    pub fn new(
        pricing: PricingEngine,
        orders: Arc<dyn OrderRepository>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            pricing,
            orders,
            sink,
        }
    }

    /// Prices, persists and announces a new pending order.
    ///
    /// A pricing failure aborts before anything is written.
    #[tracing::instrument(skip(self, request), fields(user_id = %request.user_id, items = request.order_items.len()))]
    pub async fn create_order(&self, request: CreateOrderRequest) -> Result<Order, DomainError> {
        let result = self.try_create_order(request).await;
        record_outcome("create_order", &result);
        result
    }

    async fn try_create_order(&self, request: CreateOrderRequest) -> Result<Order, DomainError> {
        let priced = self.pricing.compute_order(&request.order_items).await?;
        let order = Order::place(request, priced, Utc::now());
        let saved = self.orders.save(order).await?;

        tracing::info!(order_id = %saved.id(), total = %saved.total(), "order created");
        metrics::counter!("orders_created_total").increment(1);

        self.sink
            .publish(&OrderEvent::order_created(saved.clone(), Utc::now()))
            .await;
        Ok(saved)
    }

    /// Moves an order to a new status and announces the change.
    #[tracing::instrument(skip(self))]
    pub async fn update_status(
        &self,
        order_id: OrderId,
        requested: OrderStatus,
    ) -> Result<Order, DomainError> {
        let result = self.try_update_status(order_id, requested).await;
        record_outcome("update_status", &result);
        result
    }

    async fn try_update_status(
        &self,
        order_id: OrderId,
        requested: OrderStatus,
    ) -> Result<Order, DomainError> {
        let current = self.load(order_id).await?;
        let updated = current.transition(requested, Utc::now())?;
        let saved = self
            .orders
            .update_if_status(updated, current.status())
            .await?;

        tracing::info!(
            %order_id,
            from = %current.status(),
            to = %saved.status(),
            "order status changed"
        );
        metrics::counter!("order_status_transitions_total", "to" => saved.status().as_str())
            .increment(1);

        self.sink
            .publish(&OrderEvent::status_changed(saved.clone(), Utc::now()))
            .await;
        Ok(saved)
    }

    /// Returns the summary projection of an order.
    #[tracing::instrument(skip(self))]
    pub async fn get_summary(&self, order_id: OrderId) -> Result<OrderSummary, DomainError> {
        Ok(self.load(order_id).await?.summary())
    }

    /// Loads an order by ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<Order, DomainError> {
        self.load(order_id).await
    }

    /// Returns all orders, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>, DomainError> {
        Ok(self.orders.find_all().await?)
    }

    /// Returns the orders of one user, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn list_orders_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, DomainError> {
        Ok(self.orders.find_by_user(user_id).await?)
    }

    async fn load(&self, order_id: OrderId) -> Result<Order, DomainError> {
        self.orders
            .find_by_id(order_id)
            .await?
            .ok_or(DomainError::OrderNotFound { order_id })
    }
}

fn record_outcome<T>(operation: &'static str, result: &Result<T, DomainError>) {
    if let Err(err) = result {
        tracing::warn!(operation, error = %err, "order operation failed");
        metrics::counter!("order_errors_total", "kind" => err.kind()).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use common::{Money, ProductId};

    use super::*;
    use crate::catalog::{CatalogLookup, NewProduct, Product};
    use crate::order::{OrderItemRequest, PaymentMethod, ShippingAddress};
    use crate::repository::{InMemoryCatalog, InMemoryOrderRepository, ProductRepository};
    use crate::sink::InMemoryEventSink;

    struct Fixture {
        service: OrderService,
        catalog: InMemoryCatalog,
        orders: InMemoryOrderRepository,
        sink: InMemoryEventSink,
    }

    fn fixture() -> Fixture {
        let catalog = InMemoryCatalog::new();
        let orders = InMemoryOrderRepository::new();
        let sink = InMemoryEventSink::new();
        let shared = Arc::new(catalog.clone());
        let service = OrderService::new(
            PricingEngine::new(CatalogLookup::new(shared.clone(), shared)),
            Arc::new(orders.clone()),
            Arc::new(sink.clone()),
        );
        Fixture {
            service,
            catalog,
            orders,
            sink,
        }
    }

    async fn add_product(catalog: &InMemoryCatalog, cents: i64) -> ProductId {
        let product = Product::new(
            NewProduct {
                name: "T-shirt".to_string(),
                description: String::new(),
                base_price: Money::from_cents(cents),
                category: Default::default(),
                image_url: String::new(),
                is_active: true,
            },
            Utc::now(),
        );
        ProductRepository::save(catalog, product).await.unwrap().id
    }

    fn request(items: Vec<OrderItemRequest>) -> CreateOrderRequest {
        CreateOrderRequest {
            user_id: UserId::new("user-1"),
            payment_method: PaymentMethod::PayPal,
            shipping_address: ShippingAddress {
                address: "1 Main St".to_string(),
                postal_code: "08001".to_string(),
                city: "Barcelona".to_string(),
                country: "ES".to_string(),
            },
            order_items: items,
        }
    }

    #[tokio::test]
    async fn test_create_order_persists_and_publishes() {
        let f = fixture();
        let product = add_product(&f.catalog, 2000).await;

        let order = f
            .service
            .create_order(request(vec![OrderItemRequest::new(product, 2)]))
            .await
            .unwrap();

        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.total(), Money::from_cents(5999));
        assert_eq!(f.orders.order_count().await, 1);

        let events = f.sink.events().await;
        assert_eq!(events.len(), 1);
        match &events[0] {
            OrderEvent::OrderCreated(data) => {
                assert_eq!(data.summary.order_id, order.id());
                assert_eq!(data.summary.total, order.total());
                assert_eq!(data.order, order);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failed_pricing_persists_and_publishes_nothing() {
        let f = fixture();
        let product = add_product(&f.catalog, 2000).await;

        let err = f
            .service
            .create_order(request(vec![
                OrderItemRequest::new(product, 1),
                OrderItemRequest::new(ProductId::new(), 1),
            ]))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::ProductNotFound { .. }));
        assert_eq!(f.orders.order_count().await, 0);
        assert!(f.sink.is_empty().await);
    }

    #[tokio::test]
    async fn test_update_status_publishes_change() {
        let f = fixture();
        let product = add_product(&f.catalog, 2000).await;
        let order = f
            .service
            .create_order(request(vec![OrderItemRequest::new(product, 1)]))
            .await
            .unwrap();

        let updated = f
            .service
            .update_status(order.id(), OrderStatus::Confirmed)
            .await
            .unwrap();

        assert_eq!(updated.status(), OrderStatus::Confirmed);
        let stored = f.service.get_order(order.id()).await.unwrap();
        assert_eq!(stored.status(), OrderStatus::Confirmed);

        let events = f.sink.events().await;
        assert_eq!(events.len(), 2);
        match &events[1] {
            OrderEvent::OrderStatusChanged(data) => {
                assert_eq!(data.order_id, order.id());
                assert_eq!(data.new_status, OrderStatus::Confirmed);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_transition_leaves_order_untouched() {
        let f = fixture();
        let product = add_product(&f.catalog, 2000).await;
        let order = f
            .service
            .create_order(request(vec![OrderItemRequest::new(product, 1)]))
            .await
            .unwrap();

        let err = f
            .service
            .update_status(order.id(), OrderStatus::Shipped)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::InvalidTransition { .. }));
        let stored = f.service.get_order(order.id()).await.unwrap();
        assert_eq!(stored, order);
        assert_eq!(f.sink.len().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_order() {
        let f = fixture();
        let missing = OrderId::new();

        assert!(matches!(
            f.service.update_status(missing, OrderStatus::Confirmed).await,
            Err(DomainError::OrderNotFound { order_id }) if order_id == missing
        ));
        assert!(matches!(
            f.service.get_summary(missing).await,
            Err(DomainError::OrderNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_get_summary() {
        let f = fixture();
        let a = add_product(&f.catalog, 3000).await;
        let b = add_product(&f.catalog, 3000).await;
        let order = f
            .service
            .create_order(request(vec![
                OrderItemRequest::new(a, 1),
                OrderItemRequest::new(b, 1),
            ]))
            .await
            .unwrap();

        let summary = f.service.get_summary(order.id()).await.unwrap();
        assert_eq!(summary.item_count, 2);
        assert_eq!(summary.subtotal, Money::from_cents(6000));
        assert_eq!(summary.shipping_cost, Money::zero());
        assert_eq!(summary.total, Money::from_cents(6000));
        assert_eq!(summary.status, OrderStatus::Pending);
    }
}
