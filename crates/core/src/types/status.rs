//! Shipment status for orders.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error parsing a [`ShippedStatus`] from its wire string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid shipped status: {0}")]
pub struct ParseStatusError(String);

/// Shipment status of an order.
///
/// The delivery lifecycle is `shipping -> delivering -> delivered`.
/// `delivering -> shipping` is not a legal transition (no automatic
/// rollback). `Cancelled` is terminal and out-of-band: cancelled orders
/// never participate in delivery planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShippedStatus {
    /// Placed and waiting for a delivery robot to claim it.
    #[default]
    Shipping,
    /// Claimed by a robot and on its way.
    Delivering,
    /// Arrived at the customer.
    Delivered,
    /// Cancelled before delivery.
    Cancelled,
}

impl ShippedStatus {
    /// Whether the order is eligible for a delivery plan.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Shipping)
    }

    /// The wire/database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shipping => "shipping",
            Self::Delivering => "delivering",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ShippedStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ShippedStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shipping" => Ok(Self::Shipping),
            "delivering" => Ok(Self::Delivering),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            ShippedStatus::Shipping,
            ShippedStatus::Delivering,
            ShippedStatus::Delivered,
            ShippedStatus::Cancelled,
        ] {
            let parsed: ShippedStatus = status.as_str().parse().expect("parse");
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_status_rejects_unknown() {
        let err = "returned".parse::<ShippedStatus>().expect_err("must fail");
        assert_eq!(err.to_string(), "invalid shipped status: returned");
    }

    #[test]
    fn test_only_shipping_is_pending() {
        assert!(ShippedStatus::Shipping.is_pending());
        assert!(!ShippedStatus::Delivering.is_pending());
        assert!(!ShippedStatus::Delivered.is_pending());
        assert!(!ShippedStatus::Cancelled.is_pending());
    }
}
