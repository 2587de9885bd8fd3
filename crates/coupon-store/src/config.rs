//! Store configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Default compare-and-increment retry budget.
pub const DEFAULT_MAX_REDEEM_RETRIES: u32 = 3;

/// Default tracing filter directive.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Coupon store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// JSON file with programs and coupons to load at startup
    pub seed_file: Option<PathBuf>,

    /// How many times a redemption re-reads after losing a race
    pub max_redeem_retries: u32,

    /// tracing-subscriber EnvFilter directive
    pub log_filter: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            seed_file: None,
            max_redeem_retries: DEFAULT_MAX_REDEEM_RETRIES,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// | variable                    | default |
    /// |-----------------------------|---------|
    /// | `COUPON_SEED_FILE`          | unset   |
    /// | `COUPON_MAX_REDEEM_RETRIES` | `3`     |
    /// | `COUPON_LOG`                | `info`  |
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = StoreConfig {
            seed_file: lookup("COUPON_SEED_FILE")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),

            max_redeem_retries: lookup("COUPON_MAX_REDEEM_RETRIES")
                .unwrap_or_else(|| DEFAULT_MAX_REDEEM_RETRIES.to_string())
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("COUPON_MAX_REDEEM_RETRIES".to_string()))?,

            log_filter: lookup("COUPON_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        };

        Ok(config)
    }

    /// Overrides the seed file (e.g. from a CLI flag).
    pub fn with_seed_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.seed_file = Some(path.into());
        self
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

// =============================================================================
// Unit Tests
// =============================================================================
