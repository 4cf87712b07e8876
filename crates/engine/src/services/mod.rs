//! The function surface the handlers call.
//!
//! Each service owns a handle to the shared [`CacheIndex`](crate::cache::CacheIndex)
//! and, where it writes, the [`Store`](crate::store::Store). Services are
//! constructor-injected - nothing here reaches for ambient globals.

pub mod catalog;
pub mod delivery;
pub mod orders;

pub use catalog::CatalogService;
pub use delivery::DeliveryService;
pub use orders::OrderService;
