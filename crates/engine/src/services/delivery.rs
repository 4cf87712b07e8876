//! Robot delivery planning and status transitions.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument};

use robocart_core::{DeliveryPlan, OrderId, ShippedStatus};

use crate::cache::CacheIndex;
use crate::cancel::CancelToken;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::planner::DeliveryPlanner;
use crate::store::Store;

/// Delivery planning over the pending-shipment set plus the status
/// transitions that accompany it.
pub struct DeliveryService<S> {
    cache: Arc<CacheIndex>,
    store: Arc<S>,
    planner: DeliveryPlanner,
    plan_deadline: Duration,
}

impl<S: Store + 'static> DeliveryService<S> {
    /// Create the service over the shared index and store.
    #[must_use]
    pub fn new(cache: Arc<CacheIndex>, store: Arc<S>, config: &EngineConfig) -> Self {
        Self {
            cache,
            store,
            planner: DeliveryPlanner::new(config),
            plan_deadline: config.plan_deadline,
        }
    }

    /// Plan a delivery run under the configured deadline.
    ///
    /// # Errors
    ///
    /// As [`DeliveryService::generate_plan_with`].
    pub async fn generate_plan(&self, robot_id: &str, capacity: u32) -> Result<DeliveryPlan> {
        self.generate_plan_with(robot_id, capacity, CancelToken::with_deadline(self.plan_deadline))
            .await
    }

    /// Plan a delivery run for `robot_id` and claim the selected orders.
    ///
    /// Takes a snapshot of the pending set, solves the capacity problem on
    /// a blocking worker (the solve is CPU-bound and can run long), then
    /// marks every selected order `delivering` in the store and the index.
    /// An empty selection performs no writes.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DeadlineExceeded`] if `cancel` fires during
    /// the solve, or a store error if the claim write fails. On error no
    /// order changes status.
    #[instrument(skip(self, cancel))]
    pub async fn generate_plan_with(
        &self,
        robot_id: &str,
        capacity: u32,
        cancel: CancelToken,
    ) -> Result<DeliveryPlan> {
        let candidates = self.cache.shipping_orders()?;

        let planner = self.planner.clone();
        let robot = robot_id.to_string();
        let plan = tokio::task::spawn_blocking(move || {
            planner.plan(&robot, candidates, capacity, &cancel)
        })
        .await
        .map_err(|err| EngineError::Internal(format!("planner task failed: {err}")))??;

        if plan.is_empty() {
            return Ok(plan);
        }

        let order_ids: Vec<OrderId> = plan.orders.iter().map(|o| o.order_id).collect();
        // Durable write first; the index follows only once the store has
        // accepted the batch.
        self.store
            .update_order_statuses(&order_ids, ShippedStatus::Delivering)
            .await?;
        self.cache
            .update_statuses(&order_ids, ShippedStatus::Delivering)?;

        info!(
            robot = robot_id,
            orders = plan.orders.len(),
            weight = plan.total_weight,
            value = plan.total_value,
            "delivery plan claimed"
        );
        Ok(plan)
    }

    /// Move a single order to `status` in the store and the index.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DeadlineExceeded`] if `cancel` has already
    /// fired, [`EngineError::OrderNotFound`] for an unknown id, or a store
    /// error if the durable write fails.
    #[instrument(skip(self, cancel))]
    pub async fn update_order_status(
        &self,
        order_id: OrderId,
        status: ShippedStatus,
        cancel: &CancelToken,
    ) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(EngineError::DeadlineExceeded);
        }
        let ids = [order_id];
        self.store.update_order_statuses(&ids, status).await?;
        self.cache.update_statuses(&ids, status)?;
        Ok(())
    }

    /// Number of orders currently awaiting delivery.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DeadlineExceeded`] if `cancel` has already
    /// fired.
    pub fn pending_count(&self, cancel: &CancelToken) -> Result<usize> {
        if cancel.is_cancelled() {
            return Err(EngineError::DeadlineExceeded);
        }
        self.cache.pending_count()
    }
}
