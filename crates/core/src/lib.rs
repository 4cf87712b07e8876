//! Robocart Core - Shared domain types.
//!
//! This crate provides the common types used across all Robocart components:
//! - `engine` - The in-process data plane (indices, paging, delivery planning)
//! - `store` - The `PostgreSQL` persistence layer
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no locking, no algorithms.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, order/product models, plans, and list queries

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
