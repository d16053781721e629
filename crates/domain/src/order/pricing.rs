//! Order pricing: line totals, subtotal, shipping and grand total.

use common::Money;
use futures_util::future::try_join_all;

use crate::catalog::CatalogLookup;
use crate::error::DomainError;

use super::{OrderItemRequest, OrderLineItem};

/// Subtotal from which shipping is free.
pub const FREE_SHIPPING_THRESHOLD: Money = Money::from_cents(5000);

/// Shipping charged below the free shipping threshold.
pub const FLAT_SHIPPING_COST: Money = Money::from_cents(1999);

/// Shipping cost for a given subtotal.
pub fn shipping_cost(subtotal: Money) -> Money {
    if subtotal >= FREE_SHIPPING_THRESHOLD {
        Money::zero()
    } else {
        FLAT_SHIPPING_COST
    }
}

/// Fully priced set of order lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedOrder {
    pub subtotal: Money,
    pub shipping_cost: Money,
    pub total: Money,
    /// Lines in request order.
    pub items: Vec<OrderLineItem>,
}

impl PricedOrder {
    /// Computes totals over already priced lines.
    pub fn from_items(items: Vec<OrderLineItem>) -> Result<Self, DomainError> {
        let overflow = || DomainError::AmountOverflow { product_id: None };
        let subtotal =
            Money::checked_sum(items.iter().map(|item| item.total_price)).ok_or_else(overflow)?;
        let shipping_cost = shipping_cost(subtotal);
        let total = subtotal.checked_add(shipping_cost).ok_or_else(overflow)?;
        Ok(Self {
            subtotal,
            shipping_cost,
            total,
            items,
        })
    }
}

/// Prices order requests against the catalog.
#[derive(Clone)]
pub struct PricingEngine {
    lookup: CatalogLookup,
}

impl PricingEngine {
    pub fn new(lookup: CatalogLookup) -> Self {
        Self { lookup }
    }

    /// Prices every requested line.
    ///
    /// Lookups run concurrently; the result keeps request order. The first
    /// failing line aborts the whole computation and no partial result is
    /// returned.
    #[tracing::instrument(skip(self, items), fields(item_count = items.len()))]
    pub async fn compute_order(
        &self,
        items: &[OrderItemRequest],
    ) -> Result<PricedOrder, DomainError> {
        if let Some(item) = items.iter().find(|item| item.quantity == 0) {
            return Err(DomainError::InvalidQuantity {
                product_id: item.product_id,
                quantity: item.quantity,
            });
        }

        let lines = try_join_all(items.iter().map(|item| async move {
            let pricing = self
                .lookup
                .unit_pricing(item.product_id, item.customization_id)
                .await?;
            OrderLineItem::priced(
                item.product_id,
                item.customization_id,
                item.quantity,
                pricing.base_price,
                pricing.customization_price,
            )
        }))
        .await?;

        PricedOrder::from_items(lines)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use common::{CustomizationId, ProductId};

    use super::*;
    use crate::catalog::{Customization, NewCustomization, NewProduct, Product};
    use crate::repository::{CustomizationRepository, InMemoryCatalog, ProductRepository};

    async fn seed_product(catalog: &InMemoryCatalog, cents: i64, active: bool) -> ProductId {
        let product = Product::new(
            NewProduct {
                name: "Mug".to_string(),
                description: String::new(),
                base_price: Money::from_cents(cents),
                category: Default::default(),
                image_url: String::new(),
                is_active: active,
            },
            Utc::now(),
        );
        ProductRepository::save(catalog, product).await.unwrap().id
    }

    fn engine(catalog: &InMemoryCatalog) -> PricingEngine {
        let catalog = Arc::new(catalog.clone());
        PricingEngine::new(CatalogLookup::new(catalog.clone(), catalog))
    }

    #[test]
    fn test_shipping_boundary() {
        assert_eq!(shipping_cost(Money::from_cents(5000)), Money::zero());
        assert_eq!(shipping_cost(Money::from_cents(4999)), FLAT_SHIPPING_COST);
        assert_eq!(shipping_cost(Money::from_cents(12000)), Money::zero());
        assert_eq!(shipping_cost(Money::zero()), FLAT_SHIPPING_COST);
    }

    #[test]
    fn test_empty_order_pays_shipping() {
        let priced = PricedOrder::from_items(vec![]).unwrap();
        assert_eq!(priced.subtotal, Money::zero());
        assert_eq!(priced.total, FLAT_SHIPPING_COST);
    }

    #[tokio::test]
    async fn test_single_item_below_threshold() {
        let catalog = InMemoryCatalog::new();
        let p1 = seed_product(&catalog, 2000, true).await;

        let priced = engine(&catalog)
            .compute_order(&[OrderItemRequest::new(p1, 2)])
            .await
            .unwrap();

        assert_eq!(priced.subtotal, Money::from_cents(4000));
        assert_eq!(priced.shipping_cost, Money::from_cents(1999));
        assert_eq!(priced.total, Money::from_cents(5999));
    }

    #[tokio::test]
    async fn test_two_items_reach_free_shipping() {
        let catalog = InMemoryCatalog::new();
        let a = seed_product(&catalog, 3000, true).await;
        let b = seed_product(&catalog, 3000, true).await;

        let priced = engine(&catalog)
            .compute_order(&[OrderItemRequest::new(a, 1), OrderItemRequest::new(b, 1)])
            .await
            .unwrap();

        assert_eq!(priced.subtotal, Money::from_cents(6000));
        assert_eq!(priced.shipping_cost, Money::zero());
        assert_eq!(priced.total, Money::from_cents(6000));
    }

    #[tokio::test]
    async fn test_lines_keep_request_order() {
        let catalog = InMemoryCatalog::new();
        let ids = [
            seed_product(&catalog, 100, true).await,
            seed_product(&catalog, 200, true).await,
            seed_product(&catalog, 300, true).await,
        ];
        let request: Vec<_> = ids.iter().rev().map(|id| OrderItemRequest::new(*id, 1)).collect();

        let priced = engine(&catalog).compute_order(&request).await.unwrap();

        let priced_ids: Vec<_> = priced.items.iter().map(|i| i.product_id).collect();
        assert_eq!(priced_ids, vec![ids[2], ids[1], ids[0]]);
    }

    #[tokio::test]
    async fn test_customization_adds_to_unit_price() {
        let catalog = InMemoryCatalog::new();
        let product = seed_product(&catalog, 1500, true).await;
        let customization = Customization::new(
            NewCustomization {
                product_id: product,
                color: "black".to_string(),
                custom_text: Some("Hi".to_string()),
                custom_image_url: None,
                quantity: 1,
            },
            Utc::now(),
        );
        let customization_id = CustomizationRepository::save(&catalog, customization)
            .await
            .unwrap()
            .id;

        let priced = engine(&catalog)
            .compute_order(&[OrderItemRequest::new(product, 2).with_customization(customization_id)])
            .await
            .unwrap();

        let line = &priced.items[0];
        assert_eq!(line.customization_price, Money::from_cents(800));
        assert_eq!(line.unit_price, Money::from_cents(2300));
        assert_eq!(line.total_price, Money::from_cents(4600));
    }

    #[tokio::test]
    async fn test_missing_customization_prices_product_only() {
        let catalog = InMemoryCatalog::new();
        let product = seed_product(&catalog, 1500, true).await;

        let priced = engine(&catalog)
            .compute_order(&[
                OrderItemRequest::new(product, 1).with_customization(CustomizationId::new())
            ])
            .await
            .unwrap();

        assert_eq!(priced.items[0].unit_price, Money::from_cents(1500));
        assert_eq!(priced.items[0].customization_price, Money::zero());
    }

    #[tokio::test]
    async fn test_inactive_product_fails() {
        let catalog = InMemoryCatalog::new();
        let active = seed_product(&catalog, 1000, true).await;
        let inactive = seed_product(&catalog, 1000, false).await;

        let err = engine(&catalog)
            .compute_order(&[OrderItemRequest::new(active, 1), OrderItemRequest::new(inactive, 1)])
            .await
            .unwrap_err();

        assert!(
            matches!(err, DomainError::ProductNotFound { product_id } if product_id == inactive)
        );
    }

    #[tokio::test]
    async fn test_unknown_product_fails() {
        let catalog = InMemoryCatalog::new();
        let err = engine(&catalog)
            .compute_order(&[OrderItemRequest::new(ProductId::new(), 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ProductNotFound { .. }));
    }

    #[tokio::test]
    async fn test_huge_quantity_overflows_instead_of_panicking() {
        let catalog = InMemoryCatalog::new();
        let product = seed_product(&catalog, 10_000_000_000, true).await;

        let err = engine(&catalog)
            .compute_order(&[OrderItemRequest::new(product, 1_000_000_000)])
            .await
            .unwrap_err();

        assert!(
            matches!(err, DomainError::AmountOverflow { product_id: Some(id) } if id == product)
        );
    }

    #[tokio::test]
    async fn test_subtotal_overflow_across_lines() {
        let catalog = InMemoryCatalog::new();
        let a = seed_product(&catalog, i64::MAX / 2, true).await;
        let b = seed_product(&catalog, i64::MAX / 2, true).await;

        let err = engine(&catalog)
            .compute_order(&[OrderItemRequest::new(a, 1), OrderItemRequest::new(b, 2)])
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::AmountOverflow { product_id: None }));
    }

    #[tokio::test]
    async fn test_zero_quantity_rejected() {
        let catalog = InMemoryCatalog::new();
        let product = seed_product(&catalog, 1000, true).await;
        let err = engine(&catalog)
            .compute_order(&[OrderItemRequest::new(product, 0)])
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidQuantity { quantity: 0, .. }));
    }
}
