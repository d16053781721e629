//! Order lifecycle events.

use chrono::{DateTime, Utc};
use common::{Money, OrderId, UserId};
use serde::{Deserialize, Serialize};

use super::{Order, OrderStatus};

/// Events emitted by the order service after a successful write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    /// Order was placed.
    OrderCreated(OrderCreatedData),

    /// Order moved to a new status.
    OrderStatusChanged(OrderStatusChangedData),
}

impl OrderEvent {
    /// Builds an `OrderCreated` event for a freshly persisted order.
    pub fn order_created(order: Order, timestamp: DateTime<Utc>) -> Self {
        let summary = NewOrderSummary {
            order_id: order.id(),
            user_id: order.user_id().clone(),
            total: order.total(),
            timestamp,
        };
        OrderEvent::OrderCreated(OrderCreatedData { order, summary })
    }

    /// Builds an `OrderStatusChanged` event for an updated order.
    pub fn status_changed(order: Order, timestamp: DateTime<Utc>) -> Self {
        OrderEvent::OrderStatusChanged(OrderStatusChangedData {
            order_id: order.id(),
            new_status: order.status(),
            timestamp,
            order,
        })
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderCreated(_) => "OrderCreated",
            OrderEvent::OrderStatusChanged(_) => "OrderStatusChanged",
        }
    }

    /// The order the event is about.
    pub fn order_id(&self) -> OrderId {
        match self {
            OrderEvent::OrderCreated(data) => data.summary.order_id,
            OrderEvent::OrderStatusChanged(data) => data.order_id,
        }
    }

    /// Full order state after the event.
    pub fn order(&self) -> &Order {
        match self {
            OrderEvent::OrderCreated(data) => &data.order,
            OrderEvent::OrderStatusChanged(data) => &data.order,
        }
    }
}

/// Condensed view of a new order for live feeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderSummary {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub total: Money,
    pub timestamp: DateTime<Utc>,
}

/// Data for OrderCreated event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreatedData {
    pub order: Order,
    pub summary: NewOrderSummary,
}

/// Data for OrderStatusChanged event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusChangedData {
    pub order_id: OrderId,
    pub new_status: OrderStatus,
    pub timestamp: DateTime<Utc>,
    /// The order after the transition.
    pub order: Order,
}
