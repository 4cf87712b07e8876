//! Core types for Robocart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod listing;
pub mod order;
pub mod plan;
pub mod product;
pub mod status;

pub use id::*;
pub use listing::{ListQuery, OrderSortField, ProductSortField, SearchMode, SortOrder};
pub use order::{Order, OrderDetail};
pub use plan::{DeliveryPlan, PendingOrder};
pub use product::Product;
pub use status::{ParseStatusError, ShippedStatus};
