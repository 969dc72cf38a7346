//! Unique identifier types for engine entities
//!
//! Order and trade ids use UUID v7 so they sort by creation time. Ticker
//! symbols are plain strings validated once at the engine boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::errors::OrderError;

/// Unique identifier for an order
///
/// Uses UUID v7 for time-based sorting. The id is assigned when the engine
/// accepts the order and is handed back to the caller in its `OrderHandle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Create a new OrderId with current timestamp
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create from existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get inner UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a matched trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeId(Uuid);

impl TradeId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TradeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ticker symbol of a tradable stock (e.g. "AAPL", "BRK.B")
///
/// Must be non-empty and contain no whitespace. Comparison is exact, so
/// "aapl" and "AAPL" are distinct tickers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TickerSymbol(String);

impl TickerSymbol {
    /// Create a new TickerSymbol
    ///
    /// # Panics
    /// Panics if the symbol is empty or contains whitespace
    pub fn new(symbol: impl Into<String>) -> Self {
        match Self::try_new(symbol) {
            Ok(ticker) => ticker,
            Err(err) => panic!("{err}"),
        }
    }

    /// Try to create a TickerSymbol, rejecting empty or whitespace-bearing input
    pub fn try_new(symbol: impl Into<String>) -> Result<Self, OrderError> {
        let s = symbol.into();
        if s.is_empty() {
            return Err(OrderError::InvalidTicker("ticker symbol is empty".to_string()));
        }
        if s.chars().any(char::is_whitespace) {
            return Err(OrderError::InvalidTicker(format!(
                "ticker symbol {s:?} contains whitespace"
            )));
        }
        Ok(Self(s))
    }

    /// Get the symbol string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TickerSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for TickerSymbol {
    type Error = OrderError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::try_new(s)
    }
}

impl TryFrom<&str> for TickerSymbol {
    type Error = OrderError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::try_new(s)
    }
}

impl From<TickerSymbol> for String {
    fn from(ticker: TickerSymbol) -> Self {
        ticker.0
    }
}

impl AsRef<str> for TickerSymbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
