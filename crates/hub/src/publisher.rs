//! Bridges order events from the domain into the hub.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::OrderId;
use domain::{EventSink, Order, OrderEvent, OrderStatus};
use serde::Serialize;

use crate::{Hub, Scope, event_names};

/// Broadcast payload announcing a status change.
#[derive(Debug, Serialize)]
struct StatusChangedPayload<'a> {
    order_id: OrderId,
    new_status: OrderStatus,
    timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    order: Option<&'a Order>,
}

/// [`EventSink`] that fans order events out to live subscribers.
///
/// - `OrderCreated`: broadcast `newOrder` with the condensed summary, and
///   `orderCreated` with the full order to the order's room.
/// - `OrderStatusChanged`: broadcast `orderStatusChanged`, and the same
///   payload plus the full order to the order's room.
#[derive(Clone)]
pub struct OrderEventPublisher {
    hub: Hub,
}

impl OrderEventPublisher {
    pub fn new(hub: Hub) -> Self {
        Self { hub }
    }

    async fn send<T: Serialize>(&self, scope: Scope, event: &str, payload: &T) {
        if let Err(err) = self.hub.publish_json(scope, event, payload).await {
            tracing::error!(event, error = %err, "failed to publish order event");
        }
    }
}

#[async_trait]
impl EventSink for OrderEventPublisher {
    #[tracing::instrument(skip(self, event), fields(event_type = event.event_type(), order_id = %event.order_id()))]
    async fn publish(&self, event: &OrderEvent) {
        let room = Scope::order(event.order_id());
        match event {
            OrderEvent::OrderCreated(data) => {
                self.send(Scope::Broadcast, event_names::NEW_ORDER, &data.summary)
                    .await;
                self.send(room, event_names::ORDER_CREATED, &data.order)
                    .await;
            }
            OrderEvent::OrderStatusChanged(data) => {
                let mut payload = StatusChangedPayload {
                    order_id: data.order_id,
                    new_status: data.new_status,
                    timestamp: data.timestamp,
                    order: None,
                };
                self.send(Scope::Broadcast, event_names::ORDER_STATUS_CHANGED, &payload)
                    .await;
                payload.order = Some(&data.order);
                self.send(room, event_names::ORDER_STATUS_CHANGED, &payload)
                    .await;
            }
        }
    }
}
