//! Error types for the trading engine
//!
//! Error taxonomy using thiserror. Order and index errors are returned to
//! submitters; match errors stay inside the matching loop, which logs them
//! and moves on to the next book.

use thiserror::Error;

use crate::ids::OrderId;
use crate::numeric::Quantity;

/// Top-level engine error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid order: {0}")]
    InvalidOrder(#[from] OrderError),

    #[error("Ticker index error: {0}")]
    Index(#[from] IndexError),

    #[error("Matching loop is already running")]
    AlreadyRunning,

    #[error("Invalid configuration: {message}")]
    Config { message: String },

    #[error("System error: {message}")]
    System { message: String },
}

impl EngineError {
    /// True if the order was rejected for its own fields (price, size, ticker)
    pub fn is_invalid_order(&self) -> bool {
        matches!(self, EngineError::InvalidOrder(_))
    }

    /// True if the ticker index had no room for a new ticker
    pub fn is_capacity_exceeded(&self) -> bool {
        matches!(self, EngineError::Index(IndexError::CapacityExceeded { .. }))
    }
}

/// Order validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Invalid ticker: {0}")]
    InvalidTicker(String),
}

/// Ticker index errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("Ticker index is full: all {capacity} slots are taken")]
    CapacityExceeded { capacity: usize },

    #[error("Unknown ticker: {symbol}")]
    UnknownTicker { symbol: String },
}

/// Per-book matching anomalies
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("Fill of {executed} violates remaining quantity {remaining} of order {order_id}")]
    QuantityInvariant {
        order_id: OrderId,
        remaining: Quantity,
        executed: Quantity,
    },
}
