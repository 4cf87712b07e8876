//! The persistent store collaborator.
//!
//! The engine reads and writes durable state exclusively through the
//! [`Store`] trait; it never talks SQL. `robocart-store` provides the
//! `PostgreSQL` implementation, and tests substitute an in-memory double.

use async_trait::async_trait;
use thiserror::Error;

use robocart_core::{Order, OrderId, Product, ProductId, ShippedStatus, UserId};

/// Errors surfaced by a [`Store`] implementation.
///
/// The engine propagates these verbatim and never retries.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store failed (connection, query, transaction).
    #[error("store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The store returned data the engine cannot interpret.
    #[error("store data corruption: {0}")]
    DataCorruption(String),
}

impl StoreError {
    /// Wrap a backend error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(err))
    }
}

/// Durable storage for products and orders.
///
/// Implementations must be safe to share across request tasks.
#[async_trait]
pub trait Store: Send + Sync {
    /// Load the full product catalog.
    async fn load_products(&self) -> Result<Vec<Product>, StoreError>;

    /// Load all orders in store iteration order (ascending order id).
    async fn load_orders(&self) -> Result<Vec<Order>, StoreError>;

    /// Insert one order in `shipping` status and return its assigned id.
    async fn insert_order(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<OrderId, StoreError>;

    /// Insert a batch of orders in `shipping` status and return their
    /// assigned ids, in input order.
    ///
    /// # Coupling
    ///
    /// The batch contract relies on the store's id allocator being
    /// contiguous and monotonically increasing within a batch: the ids
    /// returned for one call form an unbroken ascending range. This is an
    /// explicit coupling to the store's allocator, not an internal detail;
    /// implementations that cannot guarantee it must not implement this
    /// method by deriving ids from a starting value.
    async fn insert_orders_batch(
        &self,
        rows: &[(UserId, ProductId)],
    ) -> Result<Vec<OrderId>, StoreError>;

    /// Set the status of every listed order, as one statement.
    async fn update_order_statuses(
        &self,
        order_ids: &[OrderId],
        status: ShippedStatus,
    ) -> Result<(), StoreError>;
}
