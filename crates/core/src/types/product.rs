//! Catalog product model.

use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// A catalog product.
///
/// Immutable after catalog load except through explicit catalog updates.
/// `value` and `weight` are integers (cents and grams respectively, as
/// stored); the delivery planner depends on them being integral.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Monetary value in minor units.
    pub value: u64,
    /// Shipping weight in grams.
    pub weight: u32,
    /// Image reference (URL or asset key).
    pub image: String,
}
