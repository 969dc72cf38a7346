//! Ticker hash functions
//!
//! The index only needs a deterministic `&str -> u64`. The default is a
//! seeded Fx hash; tests swap in degenerate hashers to force collisions.

use rustc_hash::FxHasher;
use std::hash::Hasher;

/// Hash function used to pick a ticker's home slot
pub trait TickerHasher: Send + Sync {
    fn hash_ticker(&self, ticker: &str) -> u64;
}

/// Fx hash with a seed written ahead of the symbol bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeededFxHasher {
    seed: u64,
}

impl SeededFxHasher {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl TickerHasher for SeededFxHasher {
    fn hash_ticker(&self, ticker: &str) -> u64 {
        let mut hasher = FxHasher::default();
        hasher.write_u64(self.seed);
        hasher.write(ticker.as_bytes());
        hasher.finish()
    }
}

impl<F> TickerHasher for F
where
    F: Fn(&str) -> u64 + Send + Sync,
{
    fn hash_ticker(&self, ticker: &str) -> u64 {
        self(ticker)
    }
}
