//! Trading Engine Service
//!
//! Concurrent multi-ticker limit order matching. Every ticker owns an order
//! book (a buy max-heap and a sell min-heap behind one lock); a fixed
//! capacity ticker index maps symbols to book slots; a background loop scans
//! every registered book and records executed trades in an append-only log.
//!
//! **Key Invariants:**
//! - Price-time priority on both sides of every book
//! - A trade only happens when best bid >= best ask
//! - Conservation of quantity: filled + remaining == original
//! - A ticker's slot never changes once assigned

pub mod book;
pub mod config;
pub mod engine;
pub mod index;
pub mod matching;
pub mod stats;
pub mod trade_log;

pub use book::{BookSnapshot, Depth, DepthLevel, OrderBook};
pub use config::{EngineConfig, PricePolicy};
pub use engine::TradingEngine;
pub use index::{SeededFxHasher, TickerHasher, TickerIndex};
pub use stats::StatsSnapshot;
