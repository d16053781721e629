//! Value objects for the order domain.

use chrono::{DateTime, Utc};
use common::{CustomizationId, Money, OrderId, ProductId, UserId};
use serde::{Deserialize, Serialize};

use super::OrderStatus;
use crate::error::DomainError;

/// How the customer pays for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    DebitCard,
    PayPal,
    BankTransfer,
    CashOnDelivery,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::DebitCard => "debit_card",
            PaymentMethod::PayPal => "pay_pal",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::CashOnDelivery => "cash_on_delivery",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where an order is shipped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub address: String,
    pub postal_code: String,
    pub city: String,
    pub country: String,
}

/// One requested line of a new order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: ProductId,
    #[serde(default)]
    pub customization_id: Option<CustomizationId>,
    pub quantity: u32,
}

impl OrderItemRequest {
    /// Creates a request line without customization.
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            customization_id: None,
            quantity,
        }
    }

    /// Attaches a customization to the line.
    pub fn with_customization(mut self, customization_id: CustomizationId) -> Self {
        self.customization_id = Some(customization_id);
        self
    }
}

/// A validated request to place an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: UserId,
    pub payment_method: PaymentMethod,
    pub shipping_address: ShippingAddress,
    /// Lines in the order the customer listed them.
    pub order_items: Vec<OrderItemRequest>,
}

/// A priced line of a placed order.
///
/// Prices are frozen at creation time and do not follow later catalog edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub product_id: ProductId,
    pub customization_id: Option<CustomizationId>,
    pub quantity: u32,
    /// Base price plus customization price.
    pub unit_price: Money,
    /// Unit price times quantity.
    pub total_price: Money,
    /// Customization component of the unit price (zero without one).
    pub customization_price: Money,
}

impl OrderLineItem {
    /// Builds a line from its resolved price components.
    ///
    /// Fails with [`DomainError::AmountOverflow`] when the unit or line total
    /// does not fit in a [`Money`].
    pub fn priced(
        product_id: ProductId,
        customization_id: Option<CustomizationId>,
        quantity: u32,
        base_price: Money,
        customization_price: Money,
    ) -> Result<Self, DomainError> {
        let overflow = || DomainError::AmountOverflow {
            product_id: Some(product_id),
        };
        let unit_price = base_price
            .checked_add(customization_price)
            .ok_or_else(overflow)?;
        let total_price = unit_price.checked_mul(quantity).ok_or_else(overflow)?;
        Ok(Self {
            product_id,
            customization_id,
            quantity,
            unit_price,
            total_price,
            customization_price,
        })
    }
}

/// Read-only projection of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub subtotal: Money,
    pub shipping_cost: Money,
    pub total: Money,
    pub item_count: usize,
    pub created_at: DateTime<Utc>,
}
