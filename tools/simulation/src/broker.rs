//! Random broker order flow
//!
//! Each broker draws orders from its own seeded RNG, so a broker with a
//! given seed always produces the same order sequence. Prices sit on a
//! half-unit grid and quantities are whole lots.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use trading_engine::TradingEngine;
use types::errors::EngineError;
use types::numeric::{Price, Quantity};
use types::order::{OrderHandle, Side};

/// Tickers traded by the default simulation
pub const DEFAULT_TICKERS: [&str; 10] = [
    "AAPL", "MSFT", "AMZN", "GOOGL", "META", "TSLA", "NVDA", "AMD", "INTC", "IBM",
];

/// Configuration for a random broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Tickers to pick from, uniformly
    pub tickers: Vec<String>,
    /// Shares per lot
    pub lot_size: u64,
    /// Lots per order, inclusive range
    pub min_lots: u64,
    pub max_lots: u64,
    /// Limit price range, inclusive, in whole units
    pub min_price: u64,
    pub max_price: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            tickers: DEFAULT_TICKERS.iter().map(|t| t.to_string()).collect(),
            lot_size: 10,
            min_lots: 1,
            max_lots: 100,
            min_price: 10,
            max_price: 500,
        }
    }
}

/// Generated order parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokerOrder {
    pub ticker: String,
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
}

/// Outcome of one submission.
#[derive(Debug, Clone)]
pub struct Submission {
    pub order: BrokerOrder,
    pub result: Result<OrderHandle, EngineError>,
    pub latency_ns: u64,
}

/// Random broker with deterministic seeded RNG.
pub struct Broker {
    pub broker_id: usize,
    pub config: BrokerConfig,
    pub orders_submitted: usize,
    rng: ChaCha8Rng,
}

impl Broker {
    pub fn new(broker_id: usize, config: BrokerConfig, seed: u64) -> Self {
        Self {
            broker_id,
            config,
            orders_submitted: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Draw the next order.
    ///
    /// Returns None if the configuration has no tickers.
    pub fn generate_order(&mut self) -> Option<BrokerOrder> {
        if self.config.tickers.is_empty() {
            return None;
        }

        let ticker = self.config.tickers[self.rng.gen_range(0..self.config.tickers.len())].clone();
        let side = if self.rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };

        let lots = self.rng.gen_range(self.config.min_lots..=self.config.max_lots.max(self.config.min_lots));
        let quantity = Quantity::new(lots * self.config.lot_size);

        // Half-unit grid: price = halves / 2
        let min_halves = self.config.min_price * 2;
        let max_halves = (self.config.max_price * 2).max(min_halves);
        let halves = self.rng.gen_range(min_halves..=max_halves);
        let price = Price::new(Decimal::from(halves) / Decimal::TWO);

        Some(BrokerOrder { ticker, side, price, quantity })
    }

    /// Generate an order and submit it to the engine.
    ///
    /// Returns None only when no order could be generated.
    pub fn tick(&mut self, engine: &TradingEngine) -> Option<Submission> {
        let order = self.generate_order()?;

        let started = Instant::now();
        let result = engine.add_order(&order.ticker, order.side, order.price, order.quantity);
        let latency_ns = started.elapsed().as_nanos() as u64;

        self.orders_submitted += 1;
        Some(Submission { order, result, latency_ns })
    }
}
