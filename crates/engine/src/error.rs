//! Engine error types.
//!
//! Every failure in the engine is a typed return value; nothing here is
//! fatal to the process. Index operations fail fast without partial
//! mutation, and store failures propagate verbatim (retry policy, if any,
//! belongs to the caller).

use thiserror::Error;

use robocart_core::{OrderId, ProductId};

use crate::store::StoreError;

/// Engine-level error type.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A referenced product does not resolve in the index. This signals a
    /// referential-integrity violation upstream and is never silently
    /// substituted.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// A referenced order does not resolve in the index.
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    /// A bounded operation's cooperative cancellation fired. The caller
    /// must treat the index as unmodified.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// The store collaborator failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Invariant breakage inside the engine (lock poisoning, task join).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;
