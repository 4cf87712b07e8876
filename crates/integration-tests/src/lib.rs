//! Integration tests for Robocart.
//!
//! The tests exercise the full service stack (cache warm, order
//! placement, listing, delivery planning) against [`MemoryStore`], an
//! in-memory store that honors the same contracts as the `PostgreSQL`
//! implementation.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use robocart_core::{Order, OrderId, Product, ProductId, ShippedStatus, UserId};
use robocart_engine::{Store, StoreError};

/// Install a test subscriber honoring `RUST_LOG`. Safe to call from
/// every test; only the first call wins.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Default)]
struct MemoryInner {
    products: Vec<Product>,
    orders: Vec<Order>,
    next_id: i64,
}

/// In-memory store double.
///
/// Allocates order ids as one contiguous ascending range per batch,
/// matching the batch contract of the real store.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    /// Create a store seeded with a catalog.
    #[must_use]
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            inner: Mutex::new(MemoryInner {
                products,
                ..MemoryInner::default()
            }),
        }
    }

    /// Seed an existing order row, advancing the id allocator past it.
    ///
    /// # Panics
    ///
    /// Panics if the inner lock is poisoned.
    pub fn seed_order(&self, order: Order) {
        let mut inner = self.inner.lock().expect("lock");
        inner.next_id = inner.next_id.max(order.id.get());
        inner.orders.push(order);
    }

    /// Snapshot of all order rows, for asserting on durable state.
    ///
    /// # Panics
    ///
    /// Panics if the inner lock is poisoned.
    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        self.inner.lock().expect("lock").orders.clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn load_products(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.inner.lock().expect("lock").products.clone())
    }

    async fn load_orders(&self) -> Result<Vec<Order>, StoreError> {
        let mut orders = self.inner.lock().expect("lock").orders.clone();
        orders.sort_by_key(|o| o.id);
        Ok(orders)
    }

    async fn insert_order(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<OrderId, StoreError> {
        Ok(self.insert_orders_batch(&[(user_id, product_id)]).await?[0])
    }

    async fn insert_orders_batch(
        &self,
        rows: &[(UserId, ProductId)],
    ) -> Result<Vec<OrderId>, StoreError> {
        let mut inner = self.inner.lock().expect("lock");
        let now = Utc::now();
        let mut ids = Vec::with_capacity(rows.len());
        for &(user_id, product_id) in rows {
            inner.next_id += 1;
            let id = OrderId::new(inner.next_id);
            inner.orders.push(Order {
                id,
                user_id,
                product_id,
                status: ShippedStatus::Shipping,
                created_at: now,
                arrived_at: None,
            });
            ids.push(id);
        }
        Ok(ids)
    }

    async fn update_order_statuses(
        &self,
        order_ids: &[OrderId],
        status: ShippedStatus,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("lock");
        for order in &mut inner.orders {
            if order_ids.contains(&order.id) {
                order.status = status;
                if status == ShippedStatus::Delivered {
                    order.arrived_at = Some(Utc::now());
                }
            }
        }
        Ok(())
    }
}
