//! The authoritative in-memory mirror of catalog and order state.
//!
//! Every hot-path read is served from here; every order mutation is
//! applied here synchronously with the durable write, so reads are never
//! stale relative to an order's own previous write.
//!
//! The product table is built once at load and is immutable afterwards -
//! reads need no lock. The order-related indices (per-user history, the
//! reverse order-to-slot index, and the pending-shipment set) share one
//! reader/writer lock. Accessors copy data out while holding the lock;
//! callers never receive a live reference into the locked state, which is
//! what makes it safe for the delivery planner to run an unbounded-time
//! solve against data it already owns.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use chrono::Utc;
use tracing::info;

use robocart_core::{Order, OrderId, PendingOrder, Product, ProductId, ShippedStatus, UserId};

use crate::error::{EngineError, Result};
use crate::store::Store;

/// Where an order lives in the per-user history.
///
/// The position is a stable slot index, not a pointer: histories are
/// append-only apart from in-place overwrites, so a slot never moves even
/// when the backing `Vec` reallocates.
#[derive(Debug, Clone, Copy)]
struct Slot {
    user_id: UserId,
    position: usize,
}

/// Order-related indices, guarded together by one lock.
#[derive(Debug, Default)]
struct OrderIndex {
    /// Per-user order history, append-only except for in-place overwrite.
    histories: HashMap<UserId, Vec<Order>>,
    /// Reverse index: order id -> history slot. Replaces a linear scan on
    /// every status update.
    slots: HashMap<OrderId, Slot>,
    /// The pending-shipment set: exactly the orders in `shipping` status.
    pending: HashMap<OrderId, ProductId>,
}

impl OrderIndex {
    /// Insert-or-update one order and reconcile the pending set.
    ///
    /// This is the single mutation path for order state; bulk load, order
    /// placement, and status updates all funnel through it.
    fn upsert(&mut self, order: &Order) {
        match self.slots.get(&order.id) {
            Some(slot) => {
                // Known order: overwrite its history slot in place. The
                // slot's owner is authoritative - orders never change
                // hands.
                if let Some(history) = self.histories.get_mut(&slot.user_id)
                    && let Some(entry) = history.get_mut(slot.position)
                {
                    *entry = order.clone();
                }
            }
            None => {
                let history = self.histories.entry(order.user_id).or_default();
                let position = history.len();
                history.push(order.clone());
                self.slots.insert(
                    order.id,
                    Slot {
                        user_id: order.user_id,
                        position,
                    },
                );
            }
        }

        // Pending membership must always equal `status == shipping`.
        if order.status.is_pending() {
            self.pending.insert(order.id, order.product_id);
        } else {
            self.pending.remove(&order.id);
        }
    }
}

/// The in-memory index of products and orders.
///
/// Constructed once by a bulk load before any traffic is served, then
/// shared (behind an `Arc`) by every collaborator that needs it - no
/// ambient globals.
#[derive(Debug)]
pub struct CacheIndex {
    /// The catalog, sorted by product id. Immutable after load.
    catalog: Vec<Product>,
    /// Product id -> position in `catalog`.
    product_pos: HashMap<ProductId, usize>,
    orders: RwLock<OrderIndex>,
}

impl CacheIndex {
    /// Build the index from a full dump of products and orders.
    ///
    /// Orders are replayed through the same upsert path used for live
    /// updates, in store iteration order, so the loaded state is exactly
    /// what the same sequence of live updates would have produced.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ProductNotFound`] if any order references a
    /// product missing from the catalog: referential integrity is
    /// established here, before any order traffic is served.
    pub fn load(mut products: Vec<Product>, orders: Vec<Order>) -> Result<Self> {
        products.sort_by_key(|p| p.id);
        let product_pos: HashMap<ProductId, usize> = products
            .iter()
            .enumerate()
            .map(|(pos, p)| (p.id, pos))
            .collect();

        let users: HashSet<UserId> = orders.iter().map(|o| o.user_id).collect();
        let mut index = OrderIndex {
            histories: HashMap::with_capacity(users.len()),
            slots: HashMap::with_capacity(orders.len()),
            pending: HashMap::new(),
        };
        for order in &orders {
            if !product_pos.contains_key(&order.product_id) {
                return Err(EngineError::ProductNotFound(order.product_id));
            }
            index.upsert(order);
        }

        info!(
            products = products.len(),
            orders = orders.len(),
            users = users.len(),
            pending = index.pending.len(),
            "cache index loaded"
        );

        Ok(Self {
            catalog: products,
            product_pos,
            orders: RwLock::new(index),
        })
    }

    /// Load the index by pulling a full dump from the store.
    ///
    /// # Errors
    ///
    /// Propagates store failures and referential-integrity violations.
    pub async fn warm<S: Store + ?Sized>(store: &S) -> Result<Self> {
        let products = store.load_products().await?;
        let orders = store.load_orders().await?;
        Self::load(products, orders)
    }

    /// Insert or update one order (idempotent) and reconcile the
    /// pending-shipment set.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ProductNotFound`] if the order references an
    /// unknown product; the index is left unmodified.
    pub fn upsert_order(&self, order: &Order) -> Result<()> {
        if !self.product_pos.contains_key(&order.product_id) {
            return Err(EngineError::ProductNotFound(order.product_id));
        }
        let mut index = self.write_orders()?;
        index.upsert(order);
        Ok(())
    }

    /// Set the status of every listed order, as one critical section.
    /// Moving to `delivered` also stamps the arrival time.
    ///
    /// Applied all-or-nothing: every id is validated against the reverse
    /// index before anything is touched, so concurrent readers observe
    /// either the fully-old or fully-new state for the whole batch.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::OrderNotFound`] for the first unknown id;
    /// the index is left unmodified.
    pub fn update_statuses(&self, order_ids: &[OrderId], status: ShippedStatus) -> Result<()> {
        let mut index = self.write_orders()?;

        for id in order_ids {
            if !index.slots.contains_key(id) {
                return Err(EngineError::OrderNotFound(*id));
            }
        }

        for id in order_ids {
            // Validated above; a missing slot here would be a bug, and
            // skipping it beats poisoning the lock.
            let Some(slot) = index.slots.get(id).copied() else {
                continue;
            };
            let product_id = if let Some(entry) = index
                .histories
                .get_mut(&slot.user_id)
                .and_then(|history| history.get_mut(slot.position))
            {
                entry.status = status;
                if status == ShippedStatus::Delivered {
                    entry.arrived_at = Some(Utc::now());
                }
                entry.product_id
            } else {
                continue;
            };

            if status.is_pending() {
                index.pending.insert(*id, product_id);
            } else {
                index.pending.remove(id);
            }
        }
        Ok(())
    }

    /// Look up a product by id. O(1); no lock (the catalog is immutable
    /// after load).
    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.product_pos.get(&id).map(|&pos| &self.catalog[pos])
    }

    /// The full catalog, sorted by product id.
    #[must_use]
    pub fn catalog(&self) -> &[Product] {
        &self.catalog
    }

    /// Snapshot of all pending orders joined against the product table.
    ///
    /// The returned value is a copy: the delivery planner can chew on it
    /// for as long as it likes without holding the lock or observing
    /// concurrent mutation mid-computation.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ProductNotFound`] if the pending set
    /// references a product missing from the catalog (an invariant
    /// violation, impossible after a clean load).
    pub fn shipping_orders(&self) -> Result<Vec<PendingOrder>> {
        let index = self.read_orders()?;
        let mut snapshot = Vec::with_capacity(index.pending.len());
        for (&order_id, &product_id) in &index.pending {
            let product = self
                .product(product_id)
                .ok_or(EngineError::ProductNotFound(product_id))?;
            snapshot.push(PendingOrder {
                order_id,
                product_id,
                weight: product.weight,
                value: product.value,
            });
        }
        Ok(snapshot)
    }

    /// Snapshot of one user's order history, in placement order.
    ///
    /// # Errors
    ///
    /// Fails only on lock poisoning. An unknown user has an empty history.
    pub fn user_history(&self, user_id: UserId) -> Result<Vec<Order>> {
        let index = self.read_orders()?;
        Ok(index.histories.get(&user_id).cloned().unwrap_or_default())
    }

    /// Number of orders currently awaiting delivery.
    ///
    /// # Errors
    ///
    /// Fails only on lock poisoning.
    pub fn pending_count(&self) -> Result<usize> {
        Ok(self.read_orders()?.pending.len())
    }

    fn read_orders(&self) -> Result<std::sync::RwLockReadGuard<'_, OrderIndex>> {
        self.orders
            .read()
            .map_err(|_| EngineError::Internal("order index lock poisoned".to_string()))
    }

    fn write_orders(&self) -> Result<std::sync::RwLockWriteGuard<'_, OrderIndex>> {
        self.orders
            .write()
            .map_err(|_| EngineError::Internal("order index lock poisoned".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn product(id: i32, name: &str, value: u64, weight: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            description: format!("{name} description"),
            value,
            weight,
            image: format!("{name}.png"),
        }
    }

    fn order(id: i64, user: i32, product: i32, status: ShippedStatus) -> Order {
        Order {
            id: OrderId::new(id),
            user_id: UserId::new(user),
            product_id: ProductId::new(product),
            status,
            created_at: Utc.timestamp_opt(1_700_000_000 + id, 0).single().expect("ts"),
            arrived_at: None,
        }
    }

    fn sample_products() -> Vec<Product> {
        vec![
            product(1, "anvil", 120, 900),
            product(2, "kettle", 45, 300),
            product(3, "lamp", 80, 150),
        ]
    }

    /// Check the index invariants directly against the internals.
    fn assert_invariants(cache: &CacheIndex) {
        let index = cache.orders.read().expect("lock");
        for (order_id, product_id) in &index.pending {
            // Pending orders resolve through the reverse index into
            // exactly one history slot.
            let slot = index.slots.get(order_id).expect("pending order has slot");
            let entry = &index.histories[&slot.user_id][slot.position];
            assert_eq!(entry.id, *order_id);
            assert_eq!(entry.product_id, *product_id);
            // Pending implies shipping.
            assert_eq!(entry.status, ShippedStatus::Shipping);
        }
        // Shipping implies pending.
        for history in index.histories.values() {
            for entry in history {
                assert_eq!(
                    entry.status == ShippedStatus::Shipping,
                    index.pending.contains_key(&entry.id)
                );
            }
        }
        // Every slot points at the order it indexes.
        for (order_id, slot) in &index.slots {
            assert_eq!(index.histories[&slot.user_id][slot.position].id, *order_id);
        }
    }

    #[test]
    fn test_load_builds_all_indices() {
        let orders = vec![
            order(10, 1, 1, ShippedStatus::Shipping),
            order(11, 1, 2, ShippedStatus::Delivered),
            order(12, 2, 3, ShippedStatus::Shipping),
        ];
        let cache = CacheIndex::load(sample_products(), orders).expect("load");

        assert_eq!(cache.catalog().len(), 3);
        assert_eq!(cache.pending_count().expect("count"), 2);
        assert_eq!(cache.user_history(UserId::new(1)).expect("history").len(), 2);
        assert_eq!(cache.user_history(UserId::new(2)).expect("history").len(), 1);
        assert!(cache.user_history(UserId::new(9)).expect("history").is_empty());
        assert_invariants(&cache);
    }

    #[test]
    fn test_load_rejects_dangling_product_reference() {
        let orders = vec![order(10, 1, 99, ShippedStatus::Shipping)];
        let err = CacheIndex::load(sample_products(), orders).expect_err("must fail");
        assert!(matches!(err, EngineError::ProductNotFound(id) if id == ProductId::new(99)));
    }

    #[test]
    fn test_catalog_sorted_by_id() {
        let mut products = sample_products();
        products.reverse();
        let cache = CacheIndex::load(products, Vec::new()).expect("load");
        let ids: Vec<i32> = cache.catalog().iter().map(|p| p.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_upsert_twice_keeps_latest_status() {
        // Scenario: the same order id upserted with different statuses -
        // history holds only the latest, and the pending set follows.
        let cache = CacheIndex::load(sample_products(), Vec::new()).expect("load");

        let placed = order(10, 1, 1, ShippedStatus::Shipping);
        cache.upsert_order(&placed).expect("upsert");
        assert_eq!(cache.pending_count().expect("count"), 1);

        let delivered = Order {
            status: ShippedStatus::Delivered,
            ..placed
        };
        cache.upsert_order(&delivered).expect("upsert");

        let history = cache.user_history(UserId::new(1)).expect("history");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, ShippedStatus::Delivered);
        assert_eq!(cache.pending_count().expect("count"), 0);
        assert_invariants(&cache);
    }

    #[test]
    fn test_upsert_back_to_shipping_rejoins_pending() {
        let cache = CacheIndex::load(sample_products(), Vec::new()).expect("load");
        let placed = order(10, 1, 1, ShippedStatus::Cancelled);
        cache.upsert_order(&placed).expect("upsert");
        assert_eq!(cache.pending_count().expect("count"), 0);

        let reshipped = Order {
            status: ShippedStatus::Shipping,
            ..placed
        };
        cache.upsert_order(&reshipped).expect("upsert");
        assert_eq!(cache.pending_count().expect("count"), 1);
        assert_invariants(&cache);
    }

    #[test]
    fn test_upsert_rejects_unknown_product() {
        let cache = CacheIndex::load(sample_products(), Vec::new()).expect("load");
        let bad = order(10, 1, 42, ShippedStatus::Shipping);
        assert!(matches!(
            cache.upsert_order(&bad),
            Err(EngineError::ProductNotFound(_))
        ));
        assert!(cache.user_history(UserId::new(1)).expect("history").is_empty());
    }

    #[test]
    fn test_update_statuses_batch() {
        let orders = vec![
            order(10, 1, 1, ShippedStatus::Shipping),
            order(11, 2, 2, ShippedStatus::Shipping),
            order(12, 3, 3, ShippedStatus::Shipping),
        ];
        let cache = CacheIndex::load(sample_products(), orders).expect("load");

        cache
            .update_statuses(
                &[OrderId::new(10), OrderId::new(12)],
                ShippedStatus::Delivering,
            )
            .expect("batch update");

        assert_eq!(cache.pending_count().expect("count"), 1);
        let history = cache.user_history(UserId::new(1)).expect("history");
        assert_eq!(history[0].status, ShippedStatus::Delivering);
        let history = cache.user_history(UserId::new(2)).expect("history");
        assert_eq!(history[0].status, ShippedStatus::Shipping);
        assert_invariants(&cache);
    }

    #[test]
    fn test_delivered_batch_stamps_arrival_time() {
        let orders = vec![order(10, 1, 1, ShippedStatus::Delivering)];
        let cache = CacheIndex::load(sample_products(), orders).expect("load");

        cache
            .update_statuses(&[OrderId::new(10)], ShippedStatus::Delivered)
            .expect("update");

        let history = cache.user_history(UserId::new(1)).expect("history");
        assert_eq!(history[0].status, ShippedStatus::Delivered);
        assert!(history[0].arrived_at.is_some());
        assert_invariants(&cache);
    }

    #[test]
    fn test_update_statuses_unknown_id_mutates_nothing() {
        let orders = vec![order(10, 1, 1, ShippedStatus::Shipping)];
        let cache = CacheIndex::load(sample_products(), orders).expect("load");

        let err = cache
            .update_statuses(
                &[OrderId::new(10), OrderId::new(999)],
                ShippedStatus::Delivering,
            )
            .expect_err("unknown id");
        assert!(matches!(err, EngineError::OrderNotFound(id) if id == OrderId::new(999)));

        // The valid id in the batch must not have been touched.
        let history = cache.user_history(UserId::new(1)).expect("history");
        assert_eq!(history[0].status, ShippedStatus::Shipping);
        assert_eq!(cache.pending_count().expect("count"), 1);
    }

    #[test]
    fn test_shipping_orders_snapshot_joins_products() {
        let orders = vec![
            order(10, 1, 1, ShippedStatus::Shipping),
            order(11, 1, 3, ShippedStatus::Delivered),
        ];
        let cache = CacheIndex::load(sample_products(), orders).expect("load");

        let snapshot = cache.shipping_orders().expect("snapshot");
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].order_id, OrderId::new(10));
        assert_eq!(snapshot[0].weight, 900);
        assert_eq!(snapshot[0].value, 120);
    }

    #[test]
    fn test_snapshots_are_copies() {
        let orders = vec![order(10, 1, 1, ShippedStatus::Shipping)];
        let cache = CacheIndex::load(sample_products(), orders).expect("load");

        let before = cache.user_history(UserId::new(1)).expect("history");
        cache
            .update_statuses(&[OrderId::new(10)], ShippedStatus::Delivering)
            .expect("update");

        // The earlier snapshot is unaffected by the later mutation.
        assert_eq!(before[0].status, ShippedStatus::Shipping);
    }

    #[test]
    fn test_replay_matches_live_updates() {
        // Loading a dump must give the same state as applying the same
        // orders live.
        let dump = vec![
            order(10, 1, 1, ShippedStatus::Delivered),
            order(11, 1, 2, ShippedStatus::Shipping),
            order(12, 2, 2, ShippedStatus::Delivering),
        ];
        let loaded = CacheIndex::load(sample_products(), dump.clone()).expect("load");

        let live = CacheIndex::load(sample_products(), Vec::new()).expect("load");
        for o in &dump {
            live.upsert_order(o).expect("upsert");
        }

        for user in [UserId::new(1), UserId::new(2)] {
            assert_eq!(
                loaded.user_history(user).expect("history"),
                live.user_history(user).expect("history")
            );
        }
        assert_eq!(
            loaded.pending_count().expect("count"),
            live.pending_count().expect("count")
        );
    }
}
