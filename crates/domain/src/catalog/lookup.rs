//! Resolution of authoritative unit pricing from the catalog.

use std::sync::Arc;

use common::{CustomizationId, Money, ProductId};

use crate::error::DomainError;
use crate::repository::{CustomizationRepository, ProductRepository};

/// Price components of one catalog entry, as read at lookup time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitPricing {
    pub base_price: Money,
    /// Zero when no customization was requested or it was not found.
    pub customization_price: Money,
}

/// Read-only view of the catalog used by pricing.
#[derive(Clone)]
pub struct CatalogLookup {
    products: Arc<dyn ProductRepository>,
    customizations: Arc<dyn CustomizationRepository>,
}

impl CatalogLookup {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        customizations: Arc<dyn CustomizationRepository>,
    ) -> Self {
        Self {
            products,
            customizations,
        }
    }

    /// Resolves the unit pricing of a product and optional customization.
    ///
    /// Fails with [`DomainError::ProductNotFound`] when the product is
    /// missing or inactive. A customization that cannot be found contributes
    /// nothing to the price.
    pub async fn unit_pricing(
        &self,
        product_id: ProductId,
        customization_id: Option<CustomizationId>,
    ) -> Result<UnitPricing, DomainError> {
        let product = self
            .products
            .find_active_by_id(product_id)
            .await?
            .ok_or(DomainError::ProductNotFound { product_id })?;

        let customization_price = match customization_id {
            Some(customization_id) => {
                match self.customizations.find_by_id(customization_id).await? {
                    Some(customization) => customization.customization_price,
                    None => {
                        tracing::warn!(
                            %product_id,
                            %customization_id,
                            "customization not found, pricing product without it"
                        );
                        Money::zero()
                    }
                }
            }
            None => Money::zero(),
        };

        Ok(UnitPricing {
            base_price: product.base_price,
            customization_price,
        })
    }
}
