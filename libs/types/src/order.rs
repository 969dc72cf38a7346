//! Order types
//!
//! An order has an immutable identity (id, ticker, side, limit price,
//! original size, arrival stamp) and one mutable field, its remaining
//! quantity, which only the matching step decrements.

use crate::errors::{MatchError, OrderError};
use crate::ids::{OrderId, TickerSymbol};
use crate::numeric::{Price, Quantity};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order (bid)
    Buy,
    /// Sell order (ask)
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.write_str("BUY"),
            Side::Sell => f.write_str("SELL"),
        }
    }
}

/// Limit order resting in (or headed for) a ticker's book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub ticker_symbol: TickerSymbol,
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
    pub remaining_quantity: Quantity,
    /// Arrival sequence, strictly increasing across the engine
    pub timestamp: u64,
    /// Wall clock at acceptance, Unix nanos
    pub created_at: i64,
}

impl Order {
    /// Create a new unfilled order
    ///
    /// Does not validate; use [`Order::validate`] at the boundary first.
    pub fn new(
        ticker_symbol: TickerSymbol,
        side: Side,
        price: Price,
        quantity: Quantity,
        timestamp: u64,
        created_at: i64,
    ) -> Self {
        Self {
            order_id: OrderId::new(),
            ticker_symbol,
            side,
            price,
            quantity,
            remaining_quantity: quantity,
            timestamp,
            created_at,
        }
    }

    /// Check the submitted price and quantity
    ///
    /// Both must be strictly positive.
    pub fn validate(price: Price, quantity: Quantity) -> Result<(), OrderError> {
        if !price.is_positive() {
            return Err(OrderError::InvalidPrice(format!(
                "price must be positive, got {price}"
            )));
        }
        if quantity.is_zero() {
            return Err(OrderError::InvalidQuantity(
                "quantity must be positive, got 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Check quantity invariant: remaining <= original
    pub fn check_invariant(&self) -> bool {
        self.remaining_quantity <= self.quantity
    }

    /// Check if order is completely filled
    pub fn is_filled(&self) -> bool {
        self.remaining_quantity.is_zero()
    }

    /// Quantity executed so far
    pub fn filled_quantity(&self) -> Quantity {
        self.quantity
            .checked_sub(self.remaining_quantity)
            .unwrap_or(Quantity::zero())
    }

    /// Decrement the remaining quantity by an executed amount
    ///
    /// Fails without mutating if the fill is zero or larger than what is
    /// left on the order.
    pub fn fill(&mut self, executed: Quantity) -> Result<(), MatchError> {
        if executed.is_zero() {
            return Err(MatchError::QuantityInvariant {
                order_id: self.order_id,
                remaining: self.remaining_quantity,
                executed,
            });
        }
        let remaining = self.remaining_quantity.checked_sub(executed).ok_or(
            MatchError::QuantityInvariant {
                order_id: self.order_id,
                remaining: self.remaining_quantity,
                executed,
            },
        )?;
        self.remaining_quantity = remaining;
        Ok(())
    }
}

/// Receipt handed back to the caller when the engine accepts an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderHandle {
    pub order_id: OrderId,
    pub ticker_symbol: TickerSymbol,
    /// Arena slot of the ticker's book
    pub slot: usize,
    /// Arrival sequence assigned to the order
    pub timestamp: u64,
}
