//! Matched trade records
//!
//! A `MatchedOrder` is created only by the matching step and never changes
//! afterwards, apart from the log position the engine stamps on it when it
//! is appended.

use crate::ids::{OrderId, TickerSymbol, TradeId};
use crate::numeric::{Price, Quantity};
use crate::order::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One executed trade between a buy and a sell order of the same ticker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedOrder {
    pub trade_id: TradeId,
    /// Position in the engine's matched-trade log (0 until appended)
    pub sequence: u64,
    pub ticker_symbol: TickerSymbol,

    // Order references
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,

    // Execution details
    pub execution_price: Price,
    pub executed_quantity: Quantity,
    /// Side of the later-arriving order of the pair
    pub aggressor: Side,

    pub timestamp: i64, // Unix nanos
}

impl MatchedOrder {
    /// Create a new, not yet logged, trade record
    pub fn new(
        ticker_symbol: TickerSymbol,
        buy_order_id: OrderId,
        sell_order_id: OrderId,
        execution_price: Price,
        executed_quantity: Quantity,
        aggressor: Side,
        timestamp: i64,
    ) -> Self {
        Self {
            trade_id: TradeId::new(),
            sequence: 0,
            ticker_symbol,
            buy_order_id,
            sell_order_id,
            execution_price,
            executed_quantity,
            aggressor,
            timestamp,
        }
    }

    /// Calculate trade value (price × quantity)
    pub fn trade_value(&self) -> Decimal {
        self.executed_quantity.notional(self.execution_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(qty: u64) -> MatchedOrder {
        MatchedOrder::new(
            TickerSymbol::new("AAPL"),
            OrderId::new(),
            OrderId::new(),
            Price::from_u64(99),
            Quantity::new(qty),
            Side::Sell,
            1708123456789000000,
        )
    }

    #[test]
    fn test_trade_creation() {
        let trade = trade(30);

        assert_eq!(trade.sequence, 0);
        assert_eq!(trade.executed_quantity, Quantity::new(30));
        assert_ne!(trade.buy_order_id, trade.sell_order_id);
    }

    #[test]
    fn test_trade_value() {
        assert_eq!(trade(30).trade_value(), Decimal::from(2970));
    }

    #[test]
    fn test_trade_serialization() {
        let trade = trade(10);
        let json = serde_json::to_string(&trade).unwrap();
        let deserialized: MatchedOrder = serde_json::from_str(&json).unwrap();
        assert_eq!(trade, deserialized);
    }
}
