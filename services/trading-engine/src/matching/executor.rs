//! Trade execution logic
//!
//! Prices a crossed pair and builds the resulting trade record

use chrono::Utc;
use types::ids::TickerSymbol;
use types::numeric::{Price, Quantity};
use types::order::Order;
use types::trade::MatchedOrder;

use super::crossing::resting_and_aggressor;
use crate::config::PricePolicy;

/// Current wall clock as Unix nanos
pub fn unix_nanos() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX)
}

/// Builds trades for one book under a fixed pricing rule
#[derive(Debug, Clone, Copy)]
pub struct MatchExecutor {
    policy: PricePolicy,
}

impl MatchExecutor {
    pub fn new(policy: PricePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> PricePolicy {
        self.policy
    }

    /// Execution price of a crossed pair under the configured policy
    pub fn execution_price(&self, bid: &Order, ask: &Order) -> Price {
        match self.policy {
            PricePolicy::SellOrder => ask.price,
            PricePolicy::BuyOrder => bid.price,
            PricePolicy::RestingOrder => resting_and_aggressor(bid, ask).0.price,
            PricePolicy::Midpoint => bid.price.midpoint(ask.price),
        }
    }

    /// Build the trade record for `quantity` shares between `bid` and `ask`
    ///
    /// Does not touch either order; the caller applies the fills.
    pub fn execute_trade(
        &self,
        ticker: &TickerSymbol,
        bid: &Order,
        ask: &Order,
        quantity: Quantity,
        timestamp: i64,
    ) -> MatchedOrder {
        let (_, aggressor) = resting_and_aggressor(bid, ask);

        MatchedOrder::new(
            ticker.clone(),
            bid.order_id,
            ask.order_id,
            self.execution_price(bid, ask),
            quantity,
            aggressor.side,
            timestamp,
        )
    }
}
