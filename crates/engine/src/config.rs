//! Engine tuning loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `ROBOCART_PLAN_DEADLINE_MS` - Delivery-plan deadline in milliseconds
//!   (default: 10000)
//! - `ROBOCART_DP_THRESHOLD` - Problem-size bound (candidates x capacity)
//!   under which the planner uses the plain DP table (default: 20000)
//! - `ROBOCART_CANCEL_STRIDE` - Inner-loop iterations between deadline
//!   checks in the planner (default: 4096)

use std::time::Duration;

use thiserror::Error;

const DEFAULT_PLAN_DEADLINE_MS: u64 = 10_000;
const DEFAULT_DP_THRESHOLD: usize = 20_000;
const DEFAULT_CANCEL_STRIDE: usize = 4_096;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Engine tuning knobs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Deadline for a single delivery-plan request.
    pub plan_deadline: Duration,
    /// Problem-size bound under which the planner uses the plain DP table.
    pub dp_threshold: usize,
    /// Inner-loop iterations between cancellation checks.
    pub cancel_stride: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            plan_deadline: Duration::from_millis(DEFAULT_PLAN_DEADLINE_MS),
            dp_threshold: DEFAULT_DP_THRESHOLD,
            cancel_stride: DEFAULT_CANCEL_STRIDE,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a set variable fails to
    /// parse, or parses to a zero stride (the planner divides by it).
    pub fn from_env() -> Result<Self, ConfigError> {
        let plan_deadline = Duration::from_millis(parse_or(
            "ROBOCART_PLAN_DEADLINE_MS",
            DEFAULT_PLAN_DEADLINE_MS,
        )?);
        let dp_threshold = parse_or("ROBOCART_DP_THRESHOLD", DEFAULT_DP_THRESHOLD)?;
        let cancel_stride: usize = parse_or("ROBOCART_CANCEL_STRIDE", DEFAULT_CANCEL_STRIDE)?;
        if cancel_stride == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "ROBOCART_CANCEL_STRIDE".to_string(),
                "stride must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            plan_deadline,
            dp_threshold,
            cancel_stride,
        })
    }
}

/// Parse an optional environment variable, with a default when unset.
fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| ConfigError::InvalidEnvVar(name.to_string(), format!("{e}"))),
        Err(_) => Ok(default),
    }
}
