//! PostgreSQL order repository.

use async_trait::async_trait;
use common::{OrderId, UserId};
use domain::{Order, OrderRepository, OrderStatus, RepositoryResult};
use serde_json::{Value, json};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{Result, StoreError};

const SELECT_ORDERS: &str = r#"
    SELECT id, user_id, status, payment_method, subtotal_cents, shipping_cost_cents,
           total_cents, shipping_address, order_items, created_at, updated_at
    FROM orders
"#;

/// Orders stored one row per order, line items and address as JSONB.
#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Rebuilds the order from its columns through its serde representation,
    /// so amounts and items are restored exactly as they were placed.
    fn row_to_order(row: PgRow) -> Result<Order> {
        let created_at: chrono::DateTime<chrono::Utc> = row.try_get("created_at")?;
        let updated_at: chrono::DateTime<chrono::Utc> = row.try_get("updated_at")?;
        let document = json!({
            "id": row.try_get::<uuid::Uuid, _>("id")?,
            "user_id": row.try_get::<String, _>("user_id")?,
            "status": row.try_get::<String, _>("status")?,
            "payment_method": row.try_get::<String, _>("payment_method")?,
            "subtotal": row.try_get::<i64, _>("subtotal_cents")?,
            "shipping_cost": row.try_get::<i64, _>("shipping_cost_cents")?,
            "total": row.try_get::<i64, _>("total_cents")?,
            "shipping_address": row.try_get::<Value, _>("shipping_address")?,
            "order_items": row.try_get::<Value, _>("order_items")?,
            "created_at": created_at,
            "updated_at": updated_at,
        });
        Ok(serde_json::from_value(document)?)
    }

    async fn insert(&self, order: &Order) -> Result<()> {
        let shipping_address = serde_json::to_value(order.shipping_address())?;
        let order_items = serde_json::to_value(order.items())?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, status, payment_method, subtotal_cents,
                                shipping_cost_cents, total_cents, shipping_address, order_items,
                                created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(order.id().as_uuid())
        .bind(order.user_id().as_str())
        .bind(order.status().as_str())
        .bind(order.payment_method().as_str())
        .bind(order.subtotal().cents())
        .bind(order.shipping_cost().cents())
        .bind(order.total().cents())
        .bind(shipping_address)
        .bind(order_items)
        .bind(order.created_at())
        .bind(order.updated_at())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Writes status and timestamp only if the row still has `expected`.
    async fn update_status_if(&self, order: &Order, expected: OrderStatus) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = $2, updated_at = $3
            WHERE id = $1 AND status = $4
            "#,
        )
        .bind(order.id().as_uuid())
        .bind(order.status().as_str())
        .bind(order.updated_at())
        .bind(expected.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::ConcurrencyConflict {
                order_id: order.id(),
                expected,
            });
        }
        Ok(())
    }

    async fn fetch_one(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(&format!("{SELECT_ORDERS} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_order).transpose()
    }

    async fn fetch_for_user(&self, user_id: &UserId) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!(
            "{SELECT_ORDERS} WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn fetch_all(&self) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!("{SELECT_ORDERS} ORDER BY created_at DESC"))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Self::row_to_order).collect()
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    #[tracing::instrument(skip(self, order), fields(order_id = %order.id(), status = %order.status()))]
    async fn save(&self, order: Order) -> RepositoryResult<Order> {
        self.insert(&order).await?;
        Ok(order)
    }

    #[tracing::instrument(skip(self, order), fields(order_id = %order.id(), status = %order.status()))]
    async fn update_if_status(
        &self,
        order: Order,
        expected: OrderStatus,
    ) -> RepositoryResult<Order> {
        self.update_status_if(&order, expected).await?;
        Ok(order)
    }

    async fn find_by_id(&self, id: OrderId) -> RepositoryResult<Option<Order>> {
        Ok(self.fetch_one(id).await?)
    }

    async fn find_by_user(&self, user_id: &UserId) -> RepositoryResult<Vec<Order>> {
        Ok(self.fetch_for_user(user_id).await?)
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Order>> {
        Ok(self.fetch_all().await?)
    }
}
