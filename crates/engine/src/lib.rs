//! Robocart Engine - the in-process data plane.
//!
//! This crate sits between the HTTP layer (not part of this crate) and the
//! backing store. It owns three components:
//!
//! - [`cache::CacheIndex`] - the authoritative in-memory mirror of catalog
//!   and order state, guarded by a reader/writer lock
//! - [`pager`] - stable `[offset, offset + limit)` page extraction in
//!   expected O(n) without a full sort
//! - [`planner::DeliveryPlanner`] - exact 0/1 knapsack over the
//!   pending-shipment set with cooperative deadline cancellation
//!
//! The [`services`] module wires these together behind the function surface
//! the handlers call. Persistence is abstracted as the [`store::Store`]
//! trait; the engine never talks SQL.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod cancel;
pub mod config;
pub mod error;
pub mod pager;
pub mod planner;
pub mod services;
pub mod store;

pub use cache::CacheIndex;
pub use cancel::CancelToken;
pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use planner::DeliveryPlanner;
pub use store::{Store, StoreError};
