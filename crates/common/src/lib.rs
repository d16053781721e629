//! Shared identifier and money types for the order processing workspace.

pub mod money;
pub mod types;

pub use money::Money;
pub use types::{CustomizationId, OrderId, ProductId, UserId};
