//! Outbound event sinks.
//!
//! The order service only knows [`EventSink`]; real-time hubs, logs and
//! test recorders all plug in behind it.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::order::OrderEvent;

/// Receiver of order lifecycle events.
///
/// Publishing is fire-and-forget: a sink that cannot deliver drops the event.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: &OrderEvent);
}

/// Sink that logs every event through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn publish(&self, event: &OrderEvent) {
        tracing::info!(
            event_type = event.event_type(),
            order_id = %event.order_id(),
            status = %event.order().status(),
            "order event"
        );
    }
}

/// Sink that records events in memory, for tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventSink {
    events: Arc<RwLock<Vec<OrderEvent>>>,
}

impl InMemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every event published so far, oldest first.
    pub async fn events(&self) -> Vec<OrderEvent> {
        self.events.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

#[async_trait]
impl EventSink for InMemoryEventSink {
    async fn publish(&self, event: &OrderEvent) {
        self.events.write().await.push(event.clone());
    }
}

/// Sink that forwards every event to each inner sink in turn.
#[derive(Clone, Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink.
    pub fn with(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

#[async_trait]
impl EventSink for FanoutSink {
    async fn publish(&self, event: &OrderEvent) {
        for sink in &self.sinks {
            sink.publish(event).await;
        }
    }
}
