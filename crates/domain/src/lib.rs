//! Domain layer for the order processing core.
//!
//! This crate provides:
//! - Catalog entities, customization price derivation and unit price lookup
//! - The pricing engine computing line totals, shipping and grand totals
//! - The order aggregate with its lifecycle state machine
//! - The order service orchestrating pricing, persistence and events
//! - Repository ports with in-memory implementations
//! - Event sinks the order service publishes through

pub mod catalog;
pub mod error;
pub mod order;
pub mod repository;
pub mod sink;

pub use catalog::{
    CatalogLookup, CatalogService, Customization, CustomizationChanges,
    MAX_CUSTOMIZATION_QUANTITY, NewCustomization, NewProduct, Product, ProductCategory,
    ProductChanges, customization_price,
};
pub use error::DomainError;
pub use order::{
    CreateOrderRequest, NewOrderSummary, Order, OrderEvent, OrderItemRequest, OrderLineItem,
    OrderService, OrderStatus, OrderSummary, PaymentMethod, PricedOrder, PricingEngine,
    ShippingAddress,
};
pub use repository::{
    CustomizationRepository, InMemoryCatalog, InMemoryOrderRepository, OrderRepository,
    ProductRepository, RepositoryError, Result as RepositoryResult,
};
pub use sink::{EventSink, FanoutSink, InMemoryEventSink, TracingEventSink};
