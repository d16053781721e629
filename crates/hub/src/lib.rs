//! Real-time distribution of order lifecycle events.
//!
//! This crate provides the fan-out side of the order core:
//! - [`Hub`], a registry of live connections and the rooms they joined
//! - [`Scope`] for direct, broadcast and room-scoped delivery
//! - [`OrderEventPublisher`], the [`domain::EventSink`] that turns order
//!   events into hub messages

pub mod error;
pub mod message;
pub mod publisher;
pub mod registry;

pub use error::{HubError, Result};
pub use message::{Audience, ConnectionId, HubMessage, Scope, event_names, order_room};
pub use publisher::OrderEventPublisher;
pub use registry::{DEFAULT_CHANNEL_CAPACITY, Hub, Subscription};
