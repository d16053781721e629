//! PostgreSQL product and customization repository.

use async_trait::async_trait;
use common::{CustomizationId, Money, ProductId};
use domain::{
    Customization, CustomizationRepository, Product, ProductCategory, ProductRepository,
    RepositoryResult,
};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{Result, decode_quantity, decode_text, encode_quantity};

const SELECT_PRODUCTS: &str = r#"
    SELECT id, name, description, base_price_cents, category, image_url, is_active,
           created_at, updated_at
    FROM products
"#;

const SELECT_CUSTOMIZATIONS: &str = r#"
    SELECT id, product_id, color, custom_text, custom_image_url, quantity,
           customization_price_cents, created_at, updated_at
    FROM customizations
"#;

/// Catalog backed by the `products` and `customizations` tables.
#[derive(Clone)]
pub struct PostgresCatalog {
    pool: PgPool,
}

impl PostgresCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        Ok(Product {
            id: ProductId::from_uuid(row.try_get::<Uuid, _>("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            base_price: Money::from_cents(row.try_get("base_price_cents")?),
            category: decode_text(row.try_get("category")?)?,
            image_url: row.try_get("image_url")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_customization(row: PgRow) -> Result<Customization> {
        Ok(Customization {
            id: CustomizationId::from_uuid(row.try_get::<Uuid, _>("id")?),
            product_id: ProductId::from_uuid(row.try_get::<Uuid, _>("product_id")?),
            color: row.try_get("color")?,
            custom_text: row.try_get("custom_text")?,
            custom_image_url: row.try_get("custom_image_url")?,
            quantity: decode_quantity("quantity", row.try_get("quantity")?)?,
            customization_price: Money::from_cents(row.try_get("customization_price_cents")?),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    async fn fetch_product(&self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query(&format!("{SELECT_PRODUCTS} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_product).transpose()
    }

    async fn fetch_active_product(&self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query(&format!("{SELECT_PRODUCTS} WHERE id = $1 AND is_active"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_product).transpose()
    }

    async fn fetch_active_products(
        &self,
        category: Option<ProductCategory>,
    ) -> Result<Vec<Product>> {
        let rows = sqlx::query(&format!(
            "{SELECT_PRODUCTS} WHERE is_active AND ($1::TEXT IS NULL OR category = $1) \
             ORDER BY created_at DESC"
        ))
        .bind(category.map(|c| c.as_str()))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn upsert_product(&self, product: &Product) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, base_price_cents, category, image_url,
                                  is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                base_price_cents = EXCLUDED.base_price_cents,
                category = EXCLUDED.category,
                image_url = EXCLUDED.image_url,
                is_active = EXCLUDED.is_active,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.base_price.cents())
        .bind(product.category.as_str())
        .bind(&product.image_url)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn fetch_customization(&self, id: CustomizationId) -> Result<Option<Customization>> {
        let row = sqlx::query(&format!("{SELECT_CUSTOMIZATIONS} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_customization).transpose()
    }

    async fn fetch_customizations(
        &self,
        product_id: Option<ProductId>,
    ) -> Result<Vec<Customization>> {
        let rows = sqlx::query(&format!(
            "{SELECT_CUSTOMIZATIONS} WHERE ($1::UUID IS NULL OR product_id = $1) \
             ORDER BY created_at DESC"
        ))
        .bind(product_id.map(|id| id.as_uuid()))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_customization).collect()
    }

    async fn upsert_customization(&self, customization: &Customization) -> Result<()> {
        let quantity = encode_quantity("quantity", customization.quantity)?;

        sqlx::query(
            r#"
            INSERT INTO customizations (id, product_id, color, custom_text, custom_image_url,
                                        quantity, customization_price_cents, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                color = EXCLUDED.color,
                custom_text = EXCLUDED.custom_text,
                custom_image_url = EXCLUDED.custom_image_url,
                quantity = EXCLUDED.quantity,
                customization_price_cents = EXCLUDED.customization_price_cents,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(customization.id.as_uuid())
        .bind(customization.product_id.as_uuid())
        .bind(&customization.color)
        .bind(&customization.custom_text)
        .bind(&customization.custom_image_url)
        .bind(quantity)
        .bind(customization.customization_price.cents())
        .bind(customization.created_at)
        .bind(customization.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_customization(&self, id: CustomizationId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM customizations WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ProductRepository for PostgresCatalog {
    async fn find_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>> {
        Ok(self.fetch_product(id).await?)
    }

    async fn find_active_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>> {
        Ok(self.fetch_active_product(id).await?)
    }

    async fn find_active(
        &self,
        category: Option<ProductCategory>,
    ) -> RepositoryResult<Vec<Product>> {
        Ok(self.fetch_active_products(category).await?)
    }

    #[tracing::instrument(skip(self, product), fields(product_id = %product.id))]
    async fn save(&self, product: Product) -> RepositoryResult<Product> {
        self.upsert_product(&product).await?;
        Ok(product)
    }
}

#[async_trait]
impl CustomizationRepository for PostgresCatalog {
    async fn find_by_id(
        &self,
        id: CustomizationId,
    ) -> RepositoryResult<Option<Customization>> {
        Ok(self.fetch_customization(id).await?)
    }

    async fn find_all(
        &self,
        product_id: Option<ProductId>,
    ) -> RepositoryResult<Vec<Customization>> {
        Ok(self.fetch_customizations(product_id).await?)
    }

    #[tracing::instrument(skip(self, customization), fields(customization_id = %customization.id))]
    async fn save(&self, customization: Customization) -> RepositoryResult<Customization> {
        self.upsert_customization(&customization).await?;
        Ok(customization)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: CustomizationId) -> RepositoryResult<bool> {
        Ok(self.delete_customization(id).await?)
    }
}
