//! `PostgreSQL` persistence for Robocart.
//!
//! # Tables
//!
//! - `products` - the catalog (loaded once at startup, mutated out of band)
//! - `orders` - order rows; `order_id` is allocated by a `bigserial`
//!
//! The engine talks to this crate only through its `Store` trait;
//! everything SQL-shaped lives here.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod pg;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub use config::{ConfigError, StoreConfig};
pub use pg::PgStore;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
