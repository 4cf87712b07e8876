//! Per-user order history listing.

use std::sync::Arc;

use robocart_core::{ListQuery, OrderDetail, OrderSortField, SearchMode, SortOrder, UserId};

use crate::cache::CacheIndex;
use crate::error::{EngineError, Result};
use crate::pager::page_stable;

/// Order-history queries. Reads only the cache; the store is not
/// consulted on this path.
pub struct OrderService {
    cache: Arc<CacheIndex>,
}

impl OrderService {
    /// Create the service over the shared index.
    pub const fn new(cache: Arc<CacheIndex>) -> Self {
        Self { cache }
    }

    /// List one page of a user's order history and the total match count.
    ///
    /// Each history entry is joined with its product name; a non-empty
    /// search term filters on that name (prefix or substring per the
    /// query's mode) before paging. `total` counts post-filter matches.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ProductNotFound`] if a history entry
    /// references a product missing from the catalog.
    pub fn list_orders(
        &self,
        user_id: UserId,
        query: &ListQuery<OrderSortField>,
    ) -> Result<(Vec<OrderDetail>, usize)> {
        let history = self.cache.user_history(user_id)?;

        let mut rows = Vec::with_capacity(history.len());
        for order in history {
            let product = self
                .cache
                .product(order.product_id)
                .ok_or(EngineError::ProductNotFound(order.product_id))?;
            if query.has_search() {
                let matched = match query.mode {
                    SearchMode::Prefix => product.name.starts_with(&query.search),
                    SearchMode::Partial => product.name.contains(&query.search),
                };
                if !matched {
                    continue;
                }
            }
            rows.push(OrderDetail {
                order_id: order.id,
                product_id: order.product_id,
                product_name: product.name.clone(),
                status: order.status,
                created_at: order.created_at,
                arrived_at: order.arrived_at,
            });
        }

        let total = rows.len();
        let page = page_stable(
            &rows,
            order_less(query.sort, query.order),
            query.offset,
            query.limit,
        );
        Ok((page, total))
    }
}

/// Strict `less` for history rows under the requested field and
/// direction. `arrived_at` sorts not-yet-arrived orders first ascending
/// (and last descending); ties fall through to the pager's
/// original-position tie-break.
fn order_less(
    sort: OrderSortField,
    order: SortOrder,
) -> impl Fn(&OrderDetail, &OrderDetail) -> bool {
    move |a, b| {
        let ordering = match sort {
            OrderSortField::Id => a.order_id.cmp(&b.order_id),
            OrderSortField::ProductName => a.product_name.cmp(&b.product_name),
            OrderSortField::Status => a.status.as_str().cmp(b.status.as_str()),
            OrderSortField::CreatedAt => a.created_at.cmp(&b.created_at),
            OrderSortField::ArrivedAt => a.arrived_at.cmp(&b.arrived_at),
        };
        match order {
            SortOrder::Asc => ordering.is_lt(),
            SortOrder::Desc => ordering.is_gt(),
        }
    }
}
