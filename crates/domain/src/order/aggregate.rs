//! Order aggregate implementation.

use chrono::{DateTime, Utc};
use common::{Money, OrderId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

use super::{
    CreateOrderRequest, OrderLineItem, OrderStatus, OrderSummary, PaymentMethod, PricedOrder,
    ShippingAddress,
};

/// Order aggregate root.
///
/// Line items and amounts are fixed when the order is placed. Afterwards only
/// the status (through [`Order::transition`]) and `updated_at` change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    user_id: UserId,
    status: OrderStatus,
    payment_method: PaymentMethod,
    subtotal: Money,
    shipping_cost: Money,
    total: Money,
    shipping_address: ShippingAddress,
    order_items: Vec<OrderLineItem>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

// Query methods
impl Order {
    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the current status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Sum of all line totals.
    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    pub fn shipping_cost(&self) -> Money {
        self.shipping_cost
    }

    /// Subtotal plus shipping.
    pub fn total(&self) -> Money {
        self.total
    }

    pub fn shipping_address(&self) -> &ShippingAddress {
        &self.shipping_address
    }

    /// Lines in the order they were requested.
    pub fn items(&self) -> &[OrderLineItem] {
        &self.order_items
    }

    /// Returns the number of lines.
    pub fn item_count(&self) -> usize {
        self.order_items.len()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns true if the order can no longer change status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Read-only projection used by summary queries.
    pub fn summary(&self) -> OrderSummary {
        OrderSummary {
            order_id: self.id,
            status: self.status,
            subtotal: self.subtotal,
            shipping_cost: self.shipping_cost,
            total: self.total,
            item_count: self.order_items.len(),
            created_at: self.created_at,
        }
    }
}

// Command methods (return new values, never mutate in place)
impl Order {
    /// Places a new pending order from a request and its priced lines.
    pub fn place(request: CreateOrderRequest, priced: PricedOrder, now: DateTime<Utc>) -> Self {
        Self {
            id: OrderId::new(),
            user_id: request.user_id,
            status: OrderStatus::Pending,
            payment_method: request.payment_method,
            subtotal: priced.subtotal,
            shipping_cost: priced.shipping_cost,
            total: priced.total,
            shipping_address: request.shipping_address,
            order_items: priced.items,
            created_at: now,
            updated_at: now,
        }
    }

    /// Moves the order to `requested`, returning the updated order.
    ///
    /// Fails with [`DomainError::InvalidTransition`] when the lifecycle does
    /// not allow the step. Only `status` and `updated_at` differ in the result.
    pub fn transition(
        &self,
        requested: OrderStatus,
        now: DateTime<Utc>,
    ) -> Result<Order, DomainError> {
        let status = self.status.transition_to(requested)?;
        Ok(Order {
            status,
            updated_at: now,
            ..self.clone()
        })
    }
}
