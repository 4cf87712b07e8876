//! Delivery planning: exact 0/1 knapsack over the pending-shipment set.
//!
//! Given the pending orders (each with a weight and value from its
//! product) and a robot capacity, [`DeliveryPlanner`] selects the subset
//! maximizing total value subject to total weight <= capacity.
//!
//! Small instances run the standard DP table with backward
//! reconstruction. When candidates x capacity exceeds the configured
//! threshold, a divide-and-conquer variant splits the candidates in two,
//! derives O(capacity)-space value profiles for both halves, picks the
//! value-maximizing capacity split, and recurses - bounding working
//! memory to O(capacity) per level at the cost of re-deriving profiles
//! per split.
//!
//! The solver is pure: it reads a snapshot and returns a plan. Both DP
//! loops poll a [`CancelToken`] on a fixed iteration stride, so a fired
//! deadline aborts the solve instead of returning a partial plan.

use robocart_core::{DeliveryPlan, PendingOrder};
use tracing::debug;

use crate::cancel::CancelToken;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};

/// Capacity-bounded subset selection over pending orders.
#[derive(Debug, Clone)]
pub struct DeliveryPlanner {
    /// Problem-size bound (candidates x capacity) for the plain DP table.
    threshold: usize,
    /// Inner-loop iterations between cancellation checks. Checking every
    /// iteration would cost more than the arithmetic it guards.
    stride: usize,
}

/// Iteration counter shared across the whole solve, so the deadline-check
/// latency stays bounded by one stride no matter how the recursion slices
/// the work.
struct Ticker {
    ticks: usize,
    stride: usize,
}

impl Ticker {
    fn check(&mut self, cancel: &CancelToken) -> Result<()> {
        self.ticks = self.ticks.wrapping_add(1);
        if self.ticks % self.stride == 0 && cancel.is_cancelled() {
            return Err(EngineError::DeadlineExceeded);
        }
        Ok(())
    }
}

impl Default for DeliveryPlanner {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl DeliveryPlanner {
    /// Create a planner with the configured threshold and check stride.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            threshold: config.dp_threshold,
            stride: config.cancel_stride.max(1),
        }
    }

    /// Compute the value-maximizing plan for `robot_id`.
    ///
    /// Orders heavier than the capacity can never be selected and are
    /// pruned up front. If everything left fits, there is nothing to
    /// optimize.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DeadlineExceeded`] if `cancel` fires during
    /// the solve.
    pub fn plan(
        &self,
        robot_id: &str,
        candidates: Vec<PendingOrder>,
        capacity: u32,
        cancel: &CancelToken,
    ) -> Result<DeliveryPlan> {
        let pruned: Vec<PendingOrder> = candidates
            .into_iter()
            .filter(|order| order.weight <= capacity)
            .collect();
        if pruned.is_empty() {
            return Ok(DeliveryPlan::empty(robot_id.to_string()));
        }

        let total_weight: u64 = pruned.iter().map(|o| u64::from(o.weight)).sum();
        let selected = if total_weight <= u64::from(capacity) {
            pruned
        } else {
            debug!(
                candidates = pruned.len(),
                capacity, "pending orders exceed capacity, solving"
            );
            let mut ticker = Ticker {
                ticks: 0,
                stride: self.stride,
            };
            self.select(&pruned, capacity, cancel, &mut ticker)?
        };

        let total_weight = selected.iter().map(|o| u64::from(o.weight)).sum();
        let total_value = selected.iter().map(|o| o.value).sum();
        Ok(DeliveryPlan {
            robot_id: robot_id.to_string(),
            orders: selected,
            total_weight,
            total_value,
        })
    }

    /// Recursively select the best subset of `orders` within `capacity`.
    fn select(
        &self,
        orders: &[PendingOrder],
        capacity: u32,
        cancel: &CancelToken,
        ticker: &mut Ticker,
    ) -> Result<Vec<PendingOrder>> {
        let n = orders.len();
        if n == 0 || capacity == 0 {
            return Ok(Vec::new());
        }
        if n == 1 {
            return Ok(if orders[0].weight <= capacity {
                orders.to_vec()
            } else {
                Vec::new()
            });
        }
        if n.saturating_mul(capacity as usize) <= self.threshold {
            return solve_table(orders, capacity, cancel, ticker);
        }

        // Split the candidates, derive a value-by-weight profile for each
        // half in O(capacity) space, and find the capacity split that
        // maximizes the combined value. Each half then owns an independent
        // subproblem at its allotted sub-capacity.
        let (first, second) = orders.split_at(n / 2);
        let forward = value_profile(first, capacity, cancel, ticker)?;
        let backward = value_profile(second, capacity, cancel, ticker)?;

        let mut best = forward[0] + backward[capacity as usize];
        let mut split = 0u32;
        for w in 1..=capacity {
            let value = forward[w as usize] + backward[(capacity - w) as usize];
            if value > best {
                best = value;
                split = w;
            }
        }

        let mut selected = self.select(first, split, cancel, ticker)?;
        selected.extend(self.select(second, capacity - split, cancel, ticker)?);
        Ok(selected)
    }
}

/// Exact solve with the full `best[i][w]` table and backward walk.
fn solve_table(
    orders: &[PendingOrder],
    capacity: u32,
    cancel: &CancelToken,
    ticker: &mut Ticker,
) -> Result<Vec<PendingOrder>> {
    let n = orders.len();
    let cap = capacity as usize;
    let mut best = vec![vec![0u64; cap + 1]; n + 1];

    for i in 1..=n {
        let order = orders[i - 1];
        let item_weight = order.weight as usize;
        for w in 0..=cap {
            ticker.check(cancel)?;
            let mut value = best[i - 1][w];
            if item_weight <= w {
                value = value.max(best[i - 1][w - item_weight] + order.value);
            }
            best[i][w] = value;
        }
    }

    // Reconstruct: order i is in the optimum iff including it changed the
    // row.
    let mut selected = Vec::new();
    let mut w = cap;
    for i in (1..=n).rev() {
        if best[i][w] != best[i - 1][w] {
            let order = orders[i - 1];
            selected.push(order);
            w -= order.weight as usize;
        }
    }
    selected.reverse();
    Ok(selected)
}

/// Best achievable value for every sub-capacity `0..=capacity`, in
/// O(capacity) space.
fn value_profile(
    orders: &[PendingOrder],
    capacity: u32,
    cancel: &CancelToken,
    ticker: &mut Ticker,
) -> Result<Vec<u64>> {
    let cap = capacity as usize;
    let mut profile = vec![0u64; cap + 1];

    for order in orders {
        let item_weight = order.weight as usize;
        for w in (item_weight..=cap).rev() {
            ticker.check(cancel)?;
            let candidate = profile[w - item_weight] + order.value;
            if candidate > profile[w] {
                profile[w] = candidate;
            }
        }
    }
    Ok(profile)
}
