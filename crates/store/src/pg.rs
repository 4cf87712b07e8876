//! The `PostgreSQL` implementation of the engine's `Store` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use robocart_core::{Order, OrderId, Product, ProductId, ShippedStatus, UserId};
use robocart_engine::{Store, StoreError};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    product_id: ProductId,
    name: String,
    description: String,
    value: i64,
    weight: i32,
    image: String,
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let value = u64::try_from(row.value).map_err(|_| {
            StoreError::DataCorruption(format!(
                "negative value {} for product {}",
                row.value, row.product_id
            ))
        })?;
        let weight = u32::try_from(row.weight).map_err(|_| {
            StoreError::DataCorruption(format!(
                "negative weight {} for product {}",
                row.weight, row.product_id
            ))
        })?;

        Ok(Self {
            id: row.product_id,
            name: row.name,
            description: row.description,
            value,
            weight,
            image: row.image,
        })
    }
}

/// Internal row type for order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    order_id: OrderId,
    user_id: UserId,
    product_id: ProductId,
    shipped_status: String,
    created_at: DateTime<Utc>,
    arrived_at: Option<DateTime<Utc>>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status: ShippedStatus = row
            .shipped_status
            .parse()
            .map_err(|e| StoreError::DataCorruption(format!("order {}: {e}", row.order_id)))?;

        Ok(Self {
            id: row.order_id,
            user_id: row.user_id,
            product_id: row.product_id,
            status,
            created_at: row.created_at,
            arrived_at: row.arrived_at,
        })
    }
}

// =============================================================================
// Store
// =============================================================================

/// `PostgreSQL`-backed store.
///
/// Shares a connection pool; cheap to clone.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create the store over an established pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn load_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT product_id, name, description, value, weight, image
            FROM products
            ORDER BY product_id
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn load_orders(&self) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT order_id, user_id, product_id, shipped_status, created_at, arrived_at
            FROM orders
            ORDER BY order_id
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn insert_order(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<OrderId, StoreError> {
        let order_id = sqlx::query_scalar::<_, OrderId>(
            r"
            INSERT INTO orders (user_id, product_id, shipped_status)
            VALUES ($1, $2, 'shipping')
            RETURNING order_id
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(order_id)
    }

    async fn insert_orders_batch(
        &self,
        rows: &[(UserId, ProductId)],
    ) -> Result<Vec<OrderId>, StoreError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let user_ids: Vec<i32> = rows.iter().map(|(u, _)| u.get()).collect();
        let product_ids: Vec<i32> = rows.iter().map(|(_, p)| p.get()).collect();

        // One multi-row INSERT: the sequence hands the statement one
        // unbroken ascending id range, which is what the batch contract
        // promises. RETURNING preserves insertion order.
        let ids = sqlx::query_scalar::<_, OrderId>(
            r"
            INSERT INTO orders (user_id, product_id, shipped_status)
            SELECT u, p, 'shipping'
            FROM UNNEST($1::int4[], $2::int4[]) AS t(u, p)
            RETURNING order_id
            ",
        )
        .bind(&user_ids)
        .bind(&product_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        if ids.len() != rows.len() {
            return Err(StoreError::DataCorruption(format!(
                "batch insert returned {} ids for {} rows",
                ids.len(),
                rows.len()
            )));
        }

        debug!(count = ids.len(), "inserted order batch");
        Ok(ids)
    }

    async fn update_order_statuses(
        &self,
        order_ids: &[OrderId],
        status: ShippedStatus,
    ) -> Result<(), StoreError> {
        if order_ids.is_empty() {
            return Ok(());
        }

        let ids: Vec<i64> = order_ids.iter().map(|id| id.get()).collect();
        let result = sqlx::query(
            r"
            UPDATE orders
            SET shipped_status = $1,
                arrived_at = CASE WHEN $1 = 'delivered' THEN now() ELSE arrived_at END
            WHERE order_id = ANY($2)
            ",
        )
        .bind(status.as_str())
        .bind(&ids)
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        debug!(
            requested = order_ids.len(),
            updated = result.rows_affected(),
            status = %status,
            "updated order statuses"
        );
        Ok(())
    }
}
