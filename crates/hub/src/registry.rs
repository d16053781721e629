//! Connection and room registry.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{RwLock, mpsc};

use crate::{ConnectionId, HubError, HubMessage, Result, Scope};

/// Default number of undelivered messages buffered per connection.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// A registered connection and the receiving end of its channel.
#[derive(Debug)]
pub struct Subscription {
    pub id: ConnectionId,
    pub receiver: mpsc::Receiver<HubMessage>,
}

#[derive(Default)]
struct Registry {
    connections: HashMap<ConnectionId, mpsc::Sender<HubMessage>>,
    rooms: HashMap<String, HashSet<ConnectionId>>,
}

/// Fan-out hub for live subscribers.
///
/// Every connection owns a bounded channel. Publishing is best-effort:
/// a closed or full channel misses the message and nothing is replayed.
/// Recipients are snapshotted under the read lock and delivered to after
/// the lock is released.
#[derive(Clone)]
pub struct Hub {
    registry: Arc<RwLock<Registry>>,
    capacity: usize,
}

impl Default for Hub {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl Hub {
    /// Creates a hub whose connections buffer up to `capacity` messages.
    pub fn new(capacity: usize) -> Self {
        Self {
            registry: Arc::new(RwLock::new(Registry::default())),
            capacity: capacity.max(1),
        }
    }

    /// Registers a new connection.
    pub async fn connect(&self) -> Subscription {
        let (sender, receiver) = mpsc::channel(self.capacity);
        let id = ConnectionId::new();

        let mut registry = self.registry.write().await;
        registry.connections.insert(id, sender);
        metrics::gauge!("hub_connections").set(registry.connections.len() as f64);
        drop(registry);

        tracing::debug!(connection_id = %id, "connection registered");
        Subscription { id, receiver }
    }

    /// Removes a connection and its room memberships. Empty rooms are dropped.
    pub async fn disconnect(&self, id: ConnectionId) {
        let mut registry = self.registry.write().await;
        if registry.connections.remove(&id).is_none() {
            return;
        }
        registry.rooms.retain(|_, members| {
            members.remove(&id);
            !members.is_empty()
        });
        metrics::gauge!("hub_connections").set(registry.connections.len() as f64);
        drop(registry);

        tracing::debug!(connection_id = %id, "connection removed");
    }

    /// Adds a connection to a room.
    ///
    /// Returns `false` when it was already a member.
    pub async fn join(&self, id: ConnectionId, topic: &str) -> Result<bool> {
        let mut registry = self.registry.write().await;
        if !registry.connections.contains_key(&id) {
            return Err(HubError::UnknownConnection(id));
        }
        let added = registry
            .rooms
            .entry(topic.to_string())
            .or_default()
            .insert(id);
        if added {
            tracing::debug!(connection_id = %id, topic, "joined room");
        }
        Ok(added)
    }

    /// Removes a connection from a room.
    ///
    /// Returns `false` when it was not a member.
    pub async fn leave(&self, id: ConnectionId, topic: &str) -> Result<bool> {
        let mut registry = self.registry.write().await;
        if !registry.connections.contains_key(&id) {
            return Err(HubError::UnknownConnection(id));
        }
        let Some(members) = registry.rooms.get_mut(topic) else {
            return Ok(false);
        };
        let removed = members.remove(&id);
        if members.is_empty() {
            registry.rooms.remove(topic);
        }
        if removed {
            tracing::debug!(connection_id = %id, topic, "left room");
        }
        Ok(removed)
    }

    /// Delivers a message to every connection in `scope`.
    ///
    /// Returns the number of connections that accepted it.
    pub async fn publish(&self, scope: Scope, event: &str, data: serde_json::Value) -> usize {
        let recipients = self.recipients(&scope).await;
        if recipients.is_empty() {
            return 0;
        }

        let message = HubMessage {
            event: event.to_string(),
            audience: scope.audience(),
            data,
        };

        let mut delivered = 0;
        for (id, sender) in recipients {
            match sender.try_send(message.clone()) {
                Ok(()) => delivered += 1,
                Err(err) => {
                    tracing::debug!(connection_id = %id, event, error = %err, "message dropped");
                    metrics::counter!("hub_messages_dropped_total").increment(1);
                }
            }
        }
        metrics::counter!("hub_messages_delivered_total").increment(delivered as u64);
        delivered
    }

    /// Serializes `payload` and publishes it.
    pub async fn publish_json<T: Serialize>(
        &self,
        scope: Scope,
        event: &str,
        payload: &T,
    ) -> Result<usize> {
        let data = serde_json::to_value(payload)?;
        Ok(self.publish(scope, event, data).await)
    }

    pub async fn connection_count(&self) -> usize {
        self.registry.read().await.connections.len()
    }

    /// Current members of a room.
    pub async fn room_members(&self, topic: &str) -> Vec<ConnectionId> {
        self.registry
            .read()
            .await
            .rooms
            .get(topic)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    pub async fn room_count(&self) -> usize {
        self.registry.read().await.rooms.len()
    }

    async fn recipients(&self, scope: &Scope) -> Vec<(ConnectionId, mpsc::Sender<HubMessage>)> {
        let registry = self.registry.read().await;
        match scope {
            Scope::Direct(id) => registry
                .connections
                .get(id)
                .map(|sender| vec![(*id, sender.clone())])
                .unwrap_or_default(),
            Scope::Broadcast => registry
                .connections
                .iter()
                .map(|(id, sender)| (*id, sender.clone()))
                .collect(),
            Scope::Room(topic) => registry
                .rooms
                .get(topic)
                .map(|members| {
                    members
                        .iter()
                        .filter_map(|id| registry.connections.get(id).map(|s| (*id, s.clone())))
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_direct_reaches_only_target() {
        let hub = Hub::default();
        let mut a = hub.connect().await;
        let mut b = hub.connect().await;

        let delivered = hub.publish(Scope::Direct(a.id), "ping", json!(1)).await;

        assert_eq!(delivered, 1);
        assert_eq!(a.receiver.try_recv().unwrap().event, "ping");
        assert!(b.receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_join_and_leave_are_idempotent() {
        let hub = Hub::default();
        let conn = hub.connect().await;

        assert!(hub.join(conn.id, "order-1").await.unwrap());
        assert!(!hub.join(conn.id, "order-1").await.unwrap());
        assert_eq!(hub.room_members("order-1").await, vec![conn.id]);

        assert!(hub.leave(conn.id, "order-1").await.unwrap());
        assert!(!hub.leave(conn.id, "order-1").await.unwrap());
        assert_eq!(hub.room_count().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_connection_cannot_join() {
        let hub = Hub::default();
        let err = hub.join(ConnectionId::new(), "order-1").await.unwrap_err();
        assert!(matches!(err, HubError::UnknownConnection(_)));
    }

    #[tokio::test]
    async fn test_full_channel_drops_message() {
        let hub = Hub::new(1);
        let mut conn = hub.connect().await;

        assert_eq!(hub.publish(Scope::Broadcast, "first", json!(null)).await, 1);
        assert_eq!(hub.publish(Scope::Broadcast, "second", json!(null)).await, 0);

        assert_eq!(conn.receiver.recv().await.unwrap().event, "first");
        assert!(conn.receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_disconnect_prunes_rooms() {
        let hub = Hub::default();
        let a = hub.connect().await;
        let b = hub.connect().await;
        hub.join(a.id, "order-1").await.unwrap();
        hub.join(b.id, "order-1").await.unwrap();
        hub.join(a.id, "order-2").await.unwrap();

        hub.disconnect(a.id).await;

        assert_eq!(hub.connection_count().await, 1);
        assert_eq!(hub.room_members("order-1").await, vec![b.id]);
        assert!(hub.room_members("order-2").await.is_empty());
        assert_eq!(hub.room_count().await, 1);
    }
}
