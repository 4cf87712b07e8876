//! Delivery plan models.

use serde::{Deserialize, Serialize};

use super::id::{OrderId, ProductId};

/// A pending order as seen by the delivery planner: the order joined
/// with the weight and value of its product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOrder {
    pub order_id: OrderId,
    pub product_id: ProductId,
    /// Shipping weight in grams.
    pub weight: u32,
    /// Monetary value in minor units.
    pub value: u64,
}

/// The output of delivery planning: the value-maximizing subset of
/// pending orders whose total weight fits the robot's capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryPlan {
    pub robot_id: String,
    pub orders: Vec<PendingOrder>,
    pub total_weight: u64,
    pub total_value: u64,
}

impl DeliveryPlan {
    /// An empty plan for the given robot.
    #[must_use]
    pub const fn empty(robot_id: String) -> Self {
        Self {
            robot_id,
            orders: Vec::new(),
            total_weight: 0,
            total_value: 0,
        }
    }

    /// Whether the plan selects no orders.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
