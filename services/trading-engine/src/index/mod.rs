//! Ticker index
//!
//! Maps ticker symbols to integer slots of the engine's book arena with a
//! fixed-capacity open-addressing table.

pub mod hasher;
pub mod ticker_index;

pub use hasher::{SeededFxHasher, TickerHasher};
pub use ticker_index::TickerIndex;
