//! Catalog service for products and customizations.

use std::sync::Arc;

use chrono::Utc;
use common::{CustomizationId, Money, ProductId};

use crate::error::DomainError;
use crate::repository::{CustomizationRepository, ProductRepository};

use super::{
    Customization, CustomizationChanges, MAX_CUSTOMIZATION_QUANTITY, NewCustomization, NewProduct,
    Product, ProductCategory, ProductChanges,
};

/// Service for registering products and managing their customizations.
#[derive(Clone)]
pub struct CatalogService {
    products: Arc<dyn ProductRepository>,
    customizations: Arc<dyn CustomizationRepository>,
}

impl CatalogService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        customizations: Arc<dyn CustomizationRepository>,
    ) -> Self {
        Self {
            products,
            customizations,
        }
    }

    /// Registers a new product.
    #[tracing::instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, input: NewProduct) -> Result<Product, DomainError> {
        check_price(input.base_price)?;
        let product = self.products.save(Product::new(input, Utc::now())).await?;
        tracing::info!(product_id = %product.id, "product created");
        Ok(product)
    }

    /// Lists active products, newest first, optionally of one category.
    #[tracing::instrument(skip(self))]
    pub async fn list_products(
        &self,
        category: Option<ProductCategory>,
    ) -> Result<Vec<Product>, DomainError> {
        Ok(self.products.find_active(category).await?)
    }

    /// Applies a partial update to a product, active or not.
    #[tracing::instrument(skip(self, changes))]
    pub async fn update_product(
        &self,
        product_id: ProductId,
        changes: ProductChanges,
    ) -> Result<Product, DomainError> {
        if let Some(price) = changes.base_price {
            check_price(price)?;
        }
        let current = self.get_product(product_id).await?;
        let product = self
            .products
            .save(current.with_changes(changes, Utc::now()))
            .await?;
        tracing::info!(%product_id, active = product.is_active, "product updated");
        Ok(product)
    }

    /// Withdraws a product from sale.
    ///
    /// The product stays stored so existing customizations and orders keep
    /// their reference; it just stops being priced and listed.
    #[tracing::instrument(skip(self))]
    pub async fn deactivate_product(&self, product_id: ProductId) -> Result<(), DomainError> {
        self.update_product(
            product_id,
            ProductChanges {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await?;
        Ok(())
    }

    /// Loads a product regardless of its active flag.
    #[tracing::instrument(skip(self))]
    pub async fn get_product(&self, product_id: ProductId) -> Result<Product, DomainError> {
        self.products
            .find_by_id(product_id)
            .await?
            .ok_or(DomainError::ProductNotFound { product_id })
    }

    /// Creates a customization for an active product, deriving its price.
    #[tracing::instrument(skip(self, input), fields(product_id = %input.product_id))]
    pub async fn create_customization(
        &self,
        input: NewCustomization,
    ) -> Result<Customization, DomainError> {
        check_quantity(input.quantity)?;
        let product_id = input.product_id;
        self.products
            .find_active_by_id(product_id)
            .await?
            .ok_or(DomainError::ProductNotFound { product_id })?;

        let customization = self
            .customizations
            .save(Customization::new(input, Utc::now()))
            .await?;
        tracing::info!(
            customization_id = %customization.id,
            price = %customization.customization_price,
            "customization created"
        );
        Ok(customization)
    }

    /// Loads a customization.
    #[tracing::instrument(skip(self))]
    pub async fn get_customization(
        &self,
        customization_id: CustomizationId,
    ) -> Result<Customization, DomainError> {
        self.customizations
            .find_by_id(customization_id)
            .await?
            .ok_or(DomainError::CustomizationNotFound { customization_id })
    }

    /// Lists customizations, newest first, optionally of one product.
    #[tracing::instrument(skip(self))]
    pub async fn list_customizations(
        &self,
        product_id: Option<ProductId>,
    ) -> Result<Vec<Customization>, DomainError> {
        Ok(self.customizations.find_all(product_id).await?)
    }

    /// Deletes a customization.
    ///
    /// Placed orders are unaffected; their lines carry the price they were
    /// priced with.
    #[tracing::instrument(skip(self))]
    pub async fn remove_customization(
        &self,
        customization_id: CustomizationId,
    ) -> Result<(), DomainError> {
        if !self.customizations.delete(customization_id).await? {
            return Err(DomainError::CustomizationNotFound { customization_id });
        }
        tracing::info!(%customization_id, "customization removed");
        Ok(())
    }

    /// Applies a partial update and recomputes the derived price.
    ///
    /// The stored customization is only replaced once the new value is built.
    #[tracing::instrument(skip(self, changes))]
    pub async fn update_customization(
        &self,
        customization_id: CustomizationId,
        changes: CustomizationChanges,
    ) -> Result<Customization, DomainError> {
        if let Some(quantity) = changes.quantity {
            check_quantity(quantity)?;
        }
        let current = self.get_customization(customization_id).await?;
        if changes.is_empty() {
            return Ok(current);
        }
        let updated = current.with_changes(changes, Utc::now());
        Ok(self.customizations.save(updated).await?)
    }
}

fn check_price(price: Money) -> Result<(), DomainError> {
    if price.is_negative() {
        return Err(DomainError::NegativePrice { price });
    }
    Ok(())
}

fn check_quantity(quantity: u32) -> Result<(), DomainError> {
    if quantity > MAX_CUSTOMIZATION_QUANTITY {
        return Err(DomainError::QuantityTooLarge {
            quantity,
            max: MAX_CUSTOMIZATION_QUANTITY,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use common::Money;

    use super::*;
    use crate::repository::InMemoryCatalog;

    fn service() -> CatalogService {
        service_over(InMemoryCatalog::new())
    }

    fn service_over(catalog: InMemoryCatalog) -> CatalogService {
        let catalog = Arc::new(catalog);
        CatalogService::new(catalog.clone(), catalog)
    }

    fn new_product(active: bool) -> NewProduct {
        NewProduct {
            name: "Notebook".to_string(),
            description: "A5 dotted".to_string(),
            base_price: Money::from_cents(1200),
            category: crate::catalog::ProductCategory::Notebooks,
            image_url: String::new(),
            is_active: active,
        }
    }

    fn new_customization(product_id: ProductId) -> NewCustomization {
        NewCustomization {
            product_id,
            color: "black".to_string(),
            custom_text: Some("Hi".to_string()),
            custom_image_url: None,
            quantity: 1,
        }
    }

    #[tokio::test]
    async fn test_create_customization_derives_price() {
        let service = service();
        let product = service.create_product(new_product(true)).await.unwrap();

        let customization = service
            .create_customization(new_customization(product.id))
            .await
            .unwrap();

        assert_eq!(customization.customization_price, Money::from_cents(800));
        let loaded = service.get_customization(customization.id).await.unwrap();
        assert_eq!(loaded, customization);
    }

    #[tokio::test]
    async fn test_customization_requires_active_product() {
        let service = service();
        let inactive = service.create_product(new_product(false)).await.unwrap();

        let err = service
            .create_customization(new_customization(inactive.id))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ProductNotFound { .. }));

        let err = service
            .create_customization(new_customization(ProductId::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ProductNotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_customization_recomputes_price() {
        let service = service();
        let product = service.create_product(new_product(true)).await.unwrap();
        let customization = service
            .create_customization(new_customization(product.id))
            .await
            .unwrap();

        let updated = service
            .update_customization(
                customization.id,
                CustomizationChanges {
                    custom_image_url: Some("https://img/logo.png".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.customization_price, Money::from_cents(1100));
        let stored = service.get_customization(customization.id).await.unwrap();
        assert_eq!(stored.customization_price, Money::from_cents(1100));
    }

    #[tokio::test]
    async fn test_update_unknown_customization() {
        let service = service();
        let err = service
            .update_customization(CustomizationId::new(), CustomizationChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::CustomizationNotFound { .. }));
    }

    #[tokio::test]
    async fn test_negative_price_rejected() {
        let catalog = InMemoryCatalog::new();
        let service = service_over(catalog.clone());

        let err = service
            .create_product(NewProduct {
                base_price: Money::from_cents(-1),
                ..new_product(true)
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NegativePrice { price } if price.cents() == -1));
        assert_eq!(catalog.product_count().await, 0);

        let product = service.create_product(new_product(true)).await.unwrap();
        let err = service
            .update_product(
                product.id,
                ProductChanges {
                    base_price: Some(Money::from_cents(-500)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NegativePrice { .. }));
        let stored = service.get_product(product.id).await.unwrap();
        assert_eq!(stored.base_price, Money::from_cents(1200));
    }

    #[tokio::test]
    async fn test_zero_price_allowed() {
        let service = service();
        let product = service
            .create_product(NewProduct {
                base_price: Money::zero(),
                ..new_product(true)
            })
            .await
            .unwrap();
        assert!(product.base_price.is_zero());
    }

    #[tokio::test]
    async fn test_oversized_customization_quantity_rejected() {
        let catalog = InMemoryCatalog::new();
        let service = service_over(catalog.clone());
        let product = service.create_product(new_product(true)).await.unwrap();

        let err = service
            .create_customization(NewCustomization {
                quantity: u32::MAX,
                ..new_customization(product.id)
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::QuantityTooLarge { quantity: u32::MAX, max: MAX_CUSTOMIZATION_QUANTITY }
        ));
        assert_eq!(catalog.customization_count().await, 0);

        let customization = service
            .create_customization(NewCustomization {
                quantity: MAX_CUSTOMIZATION_QUANTITY,
                ..new_customization(product.id)
            })
            .await
            .unwrap();
        let err = service
            .update_customization(
                customization.id,
                CustomizationChanges {
                    quantity: Some(MAX_CUSTOMIZATION_QUANTITY + 1),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::QuantityTooLarge { .. }));
    }

    #[tokio::test]
    async fn test_list_and_update_products() {
        let service = service();
        let notebook = service.create_product(new_product(true)).await.unwrap();
        let mug = service
            .create_product(NewProduct {
                category: ProductCategory::Mugs,
                ..new_product(true)
            })
            .await
            .unwrap();
        service.create_product(new_product(false)).await.unwrap();

        assert_eq!(service.list_products(None).await.unwrap().len(), 2);
        let mugs = service
            .list_products(Some(ProductCategory::Mugs))
            .await
            .unwrap();
        assert_eq!(mugs, vec![mug.clone()]);

        let renamed = service
            .update_product(
                notebook.id,
                ProductChanges {
                    name: Some("Notebook XL".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "Notebook XL");
        assert_eq!(renamed.base_price, notebook.base_price);

        let err = service
            .update_product(ProductId::new(), ProductChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ProductNotFound { .. }));
    }

    #[tokio::test]
    async fn test_deactivated_product_is_hidden_but_kept() {
        let catalog = InMemoryCatalog::new();
        let service = service_over(catalog.clone());
        let product = service.create_product(new_product(true)).await.unwrap();

        service.deactivate_product(product.id).await.unwrap();

        assert!(service.list_products(None).await.unwrap().is_empty());
        assert!(!service.get_product(product.id).await.unwrap().is_active);
        assert_eq!(catalog.product_count().await, 1);
        let err = service
            .create_customization(new_customization(product.id))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ProductNotFound { .. }));

        let err = service
            .deactivate_product(ProductId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ProductNotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_and_remove_customizations() {
        let service = service();
        let product = service.create_product(new_product(true)).await.unwrap();
        let other = service.create_product(new_product(true)).await.unwrap();
        let first = service
            .create_customization(new_customization(product.id))
            .await
            .unwrap();
        service
            .create_customization(new_customization(other.id))
            .await
            .unwrap();

        assert_eq!(service.list_customizations(None).await.unwrap().len(), 2);
        let for_product = service
            .list_customizations(Some(product.id))
            .await
            .unwrap();
        assert_eq!(for_product, vec![first.clone()]);

        service.remove_customization(first.id).await.unwrap();
        assert!(matches!(
            service.get_customization(first.id).await,
            Err(DomainError::CustomizationNotFound { .. })
        ));
        assert!(matches!(
            service.remove_customization(first.id).await,
            Err(DomainError::CustomizationNotFound { customization_id }) if customization_id == first.id
        ));
    }
}
