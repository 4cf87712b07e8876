//! Catalog listing and order placement.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};

use robocart_core::{
    ListQuery, Order, OrderId, Product, ProductId, ProductSortField, ShippedStatus, SortOrder,
    UserId,
};

use crate::cache::CacheIndex;
use crate::error::{EngineError, Result};
use crate::pager::page_stable;
use crate::store::Store;

/// Product catalog queries and order placement.
pub struct CatalogService<S> {
    cache: Arc<CacheIndex>,
    store: Arc<S>,
}

impl<S: Store> CatalogService<S> {
    /// Create the service over the shared index and store.
    pub const fn new(cache: Arc<CacheIndex>, store: Arc<S>) -> Self {
        Self { cache, store }
    }

    /// List one page of the catalog and the total match count.
    ///
    /// An empty search term pages the whole catalog; a non-empty one first
    /// narrows it by substring scan over name and description. Either way
    /// the page matches the `[offset, offset + limit)` slice of a full
    /// stable sort.
    #[must_use]
    pub fn list_products(&self, query: &ListQuery<ProductSortField>) -> (Vec<Product>, usize) {
        let less = product_less(query.sort, query.order);
        let catalog = self.cache.catalog();

        if query.has_search() {
            let matches: Vec<Product> = catalog
                .iter()
                .filter(|p| p.name.contains(&query.search) || p.description.contains(&query.search))
                .cloned()
                .collect();
            let page = page_stable(&matches, less, query.offset, query.limit);
            (page, matches.len())
        } else {
            let page = page_stable(catalog, less, query.offset, query.limit);
            (page, catalog.len())
        }
    }

    /// Place orders: one order row per unit of quantity, all in
    /// `shipping` status.
    ///
    /// Every product is validated against the catalog before anything is
    /// inserted. The store assigns ids (see the batch-contiguity contract
    /// on [`Store::insert_orders_batch`]); the new orders are then applied
    /// to the index through the regular upsert path, so they are
    /// immediately visible to history reads and delivery planning.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ProductNotFound`] before any insert if an
    /// item references an unknown product, or a store error verbatim.
    #[instrument(skip(self))]
    pub async fn create_orders(
        &self,
        user_id: UserId,
        items: &[(ProductId, u32)],
    ) -> Result<Vec<OrderId>> {
        let mut rows: Vec<(UserId, ProductId)> = Vec::new();
        for &(product_id, quantity) in items {
            if quantity == 0 {
                continue;
            }
            if self.cache.product(product_id).is_none() {
                return Err(EngineError::ProductNotFound(product_id));
            }
            for _ in 0..quantity {
                rows.push((user_id, product_id));
            }
        }
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids = self.store.insert_orders_batch(&rows).await?;
        let now = Utc::now();
        for (&id, &(user_id, product_id)) in ids.iter().zip(&rows) {
            let order = Order {
                id,
                user_id,
                product_id,
                status: ShippedStatus::Shipping,
                created_at: now,
                arrived_at: None,
            };
            self.cache.upsert_order(&order)?;
        }

        info!(count = ids.len(), user = %user_id, "created orders");
        Ok(ids)
    }
}

/// Strict `less` for products under the requested field and direction.
/// Ties are left to the pager's original-position tie-break.
fn product_less(sort: ProductSortField, order: SortOrder) -> impl Fn(&Product, &Product) -> bool {
    move |a, b| {
        let ordering = match sort {
            ProductSortField::Id => a.id.cmp(&b.id),
            ProductSortField::Name => a.name.cmp(&b.name),
            ProductSortField::Description => a.description.cmp(&b.description),
            ProductSortField::Value => a.value.cmp(&b.value),
            ProductSortField::Weight => a.weight.cmp(&b.weight),
            ProductSortField::Image => a.image.cmp(&b.image),
        };
        match order {
            SortOrder::Asc => ordering.is_lt(),
            SortOrder::Desc => ordering.is_gt(),
        }
    }
}
