//! Crossing detection logic
//!
//! Determines when the best bid and best ask of a book can trade

use types::numeric::Price;
use types::order::Order;

/// Check if a bid and ask can match at given prices
///
/// The spread has crossed when the buy price is at or above the sell price.
pub fn can_match(bid_price: Price, ask_price: Price) -> bool {
    bid_price >= ask_price
}

/// The earlier-arriving order of a pair rests, the later one aggresses
///
/// Returns (resting, aggressor).
pub fn resting_and_aggressor<'a>(bid: &'a Order, ask: &'a Order) -> (&'a Order, &'a Order) {
    if bid.timestamp <= ask.timestamp {
        (bid, ask)
    } else {
        (ask, bid)
    }
}
