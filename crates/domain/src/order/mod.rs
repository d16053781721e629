//! Order aggregate, pricing, lifecycle and service.

mod aggregate;
mod events;
mod pricing;
mod service;
mod state;
mod value_objects;

pub use aggregate::Order;
pub use events::{NewOrderSummary, OrderCreatedData, OrderEvent, OrderStatusChangedData};
pub use pricing::{
    FLAT_SHIPPING_COST, FREE_SHIPPING_THRESHOLD, PricedOrder, PricingEngine, shipping_cost,
};
pub use service::OrderService;
pub use state::OrderStatus;
pub use value_objects::{
    CreateOrderRequest, OrderItemRequest, OrderLineItem, OrderSummary, PaymentMethod,
    ShippingAddress,
};
