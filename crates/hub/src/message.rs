//! Connection identifiers, delivery scopes and outbound messages.

use common::OrderId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event names shared with socket clients.
pub mod event_names {
    pub const CONNECTED: &str = "connected";
    pub const ORDER_CREATED: &str = "orderCreated";
    pub const NEW_ORDER: &str = "newOrder";
    pub const ORDER_STATUS_UPDATED: &str = "orderStatusUpdated";
    pub const ORDER_STATUS_CHANGED: &str = "orderStatusChanged";
    pub const ORDER_SUMMARY: &str = "orderSummary";
    pub const ORDER_ERROR: &str = "orderError";
    pub const JOINED_ORDER_ROOM: &str = "joinedOrderRoom";
    pub const LEFT_ORDER_ROOM: &str = "leftOrderRoom";
}

/// Identifier of one live subscriber connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Room topic for a single order.
pub fn order_room(order_id: OrderId) -> String {
    format!("order-{order_id}")
}

/// Target of a publish call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Only the given connection.
    Direct(ConnectionId),
    /// Every connected subscriber.
    Broadcast,
    /// Members of a room topic.
    Room(String),
}

impl Scope {
    /// Scope for the room of an order.
    pub fn order(order_id: OrderId) -> Self {
        Scope::Room(order_room(order_id))
    }

    pub fn audience(&self) -> Audience {
        match self {
            Scope::Direct(_) => Audience::Direct,
            Scope::Broadcast => Audience::Broadcast,
            Scope::Room(topic) => Audience::Room(topic.clone()),
        }
    }
}

/// How a message reached its receiver, as seen by the receiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "topic", rename_all = "snake_case")]
pub enum Audience {
    Direct,
    Broadcast,
    Room(String),
}

/// A message delivered to a connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubMessage {
    pub event: String,
    pub audience: Audience,
    pub data: serde_json::Value,
}
