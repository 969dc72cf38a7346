//! Engine configuration
//!
//! Capacity, hashing and pricing are named parameters rather than
//! constants baked into the engine, so tests can run with tiny indexes and
//! colliding hash functions.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use types::errors::EngineError;

/// Default number of ticker slots (and order books)
pub const DEFAULT_CAPACITY: usize = 1600;

/// Default seed mixed into the ticker hash
pub const DEFAULT_HASH_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

/// Default pause between two full scans of the matching loop
pub const DEFAULT_SCAN_INTERVAL_MS: u64 = 1;

/// Rule deciding the execution price of a crossed pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricePolicy {
    /// The sell order's limit price
    #[default]
    SellOrder,
    /// The buy order's limit price
    BuyOrder,
    /// The limit price of whichever order arrived first
    RestingOrder,
    /// Exact midpoint of the two limit prices
    Midpoint,
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of ticker slots; fixed for the engine's lifetime
    pub capacity: usize,
    /// Seed for the default ticker hasher
    pub hash_seed: u64,
    /// Execution price rule
    pub price_policy: PricePolicy,
    /// Pause between scans in milliseconds (0 = yield only)
    pub scan_interval_ms: u64,
    /// Match steps attempted per book per scan
    pub max_matches_per_book: usize,
    /// Register unseen tickers on first order
    pub dynamic_registration: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            hash_seed: DEFAULT_HASH_SEED,
            price_policy: PricePolicy::default(),
            scan_interval_ms: DEFAULT_SCAN_INTERVAL_MS,
            max_matches_per_book: 1,
            dynamic_registration: true,
        }
    }
}

impl EngineConfig {
    /// Default configuration with a different capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(json).map_err(|e| EngineError::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.capacity == 0 {
            return Err(EngineError::Config {
                message: "capacity must be at least 1".to_string(),
            });
        }
        if self.max_matches_per_book == 0 {
            return Err(EngineError::Config {
                message: "max_matches_per_book must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_millis(self.scan_interval_ms)
    }
}
