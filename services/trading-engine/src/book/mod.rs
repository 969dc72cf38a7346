//! Order book for a single ticker
//!
//! Each book owns a bid heap and an ask heap behind one lock. The lock is
//! the unit of mutual exclusion: it is held for one insert or one match
//! burst, never across books.

pub mod price_heap;
pub mod priority;

pub use price_heap::{AskHeap, BidHeap, DepthLevel, PriceHeap};
pub use priority::{AskPriority, BidPriority, HeapPriority};

use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::binary_heap::PeekMut;
use std::sync::atomic::{AtomicU64, Ordering};
use types::errors::MatchError;
use types::ids::TickerSymbol;
use types::numeric::{Price, Quantity};
use types::order::{Order, Side};
use types::trade::MatchedOrder;

use crate::config::PricePolicy;
use crate::matching::executor::unix_nanos;
use crate::matching::{can_match, MatchExecutor};

/// Resting orders of one book, best first on each side
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookSnapshot {
    pub ticker: TickerSymbol,
    pub bids: Vec<Order>,
    pub asks: Vec<Order>,
}

impl BookSnapshot {
    /// Remaining quantity across both sides
    pub fn resting_quantity(&self) -> Quantity {
        self.bids
            .iter()
            .chain(self.asks.iter())
            .map(|o| o.remaining_quantity)
            .sum()
    }
}

/// Aggregated price levels of one book
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Depth {
    /// Best bids in descending price order
    pub bids: Vec<DepthLevel>,
    /// Best asks in ascending price order
    pub asks: Vec<DepthLevel>,
}

#[derive(Debug, Default)]
struct BookSides {
    bids: BidHeap,
    asks: AskHeap,
}

impl BookSides {
    /// One match step; see [`OrderBook::try_match`]
    fn match_step(
        &mut self,
        ticker: &TickerSymbol,
        executor: &MatchExecutor,
    ) -> Result<Option<MatchedOrder>, MatchError> {
        let (Some(mut bid), Some(mut ask)) = (self.bids.peek_mut(), self.asks.peek_mut()) else {
            return Ok(None);
        };

        if !can_match(bid.order().price, ask.order().price) {
            return Ok(None);
        }

        let executed = bid
            .order()
            .remaining_quantity
            .min(ask.order().remaining_quantity);
        if executed.is_zero() {
            // peek_mut purges filled entries, so both tops must have quantity left
            return Err(MatchError::QuantityInvariant {
                order_id: bid.order().order_id,
                remaining: bid.order().remaining_quantity,
                executed,
            });
        }

        let trade = executor.execute_trade(ticker, bid.order(), ask.order(), executed, unix_nanos());

        bid.fill(executed)?;
        ask.fill(executed)?;

        if bid.order().is_filled() {
            PeekMut::pop(bid);
        }
        if ask.order().is_filled() {
            PeekMut::pop(ask);
        }

        Ok(Some(trade))
    }
}

/// Thread-safe order book for a single ticker
#[derive(Debug)]
pub struct OrderBook {
    ticker: TickerSymbol,
    executor: MatchExecutor,
    sides: Mutex<BookSides>,
}

impl OrderBook {
    pub fn new(ticker: TickerSymbol, policy: PricePolicy) -> Self {
        Self {
            ticker,
            executor: MatchExecutor::new(policy),
            sides: Mutex::new(BookSides::default()),
        }
    }

    pub fn ticker(&self) -> &TickerSymbol {
        &self.ticker
    }

    /// Insert an order on its side; O(log n)
    pub fn insert(&self, order: Order) {
        debug_assert_eq!(order.ticker_symbol, self.ticker, "order routed to the wrong book");
        let mut sides = self.sides.lock();
        match order.side {
            Side::Buy => sides.bids.push(order),
            Side::Sell => sides.asks.push(order),
        }
    }

    /// Insert an order, stamping its arrival sequence from `clock` under the
    /// book lock so that timestamp order equals insertion order in this book
    pub(crate) fn insert_stamped(&self, mut order: Order, clock: &AtomicU64) -> u64 {
        debug_assert_eq!(order.ticker_symbol, self.ticker, "order routed to the wrong book");
        let mut sides = self.sides.lock();
        let timestamp = clock.fetch_add(1, Ordering::SeqCst) + 1;
        order.timestamp = timestamp;
        match order.side {
            Side::Buy => sides.bids.push(order),
            Side::Sell => sides.asks.push(order),
        }
        timestamp
    }

    /// Best eligible order of a side, without removing it
    pub fn peek_best(&self, side: Side) -> Option<Order> {
        let mut sides = self.sides.lock();
        match side {
            Side::Buy => sides.bids.peek().cloned(),
            Side::Sell => sides.asks.peek().cloned(),
        }
    }

    /// Remove and return the best eligible order of a side
    pub fn pop_best(&self, side: Side) -> Option<Order> {
        let mut sides = self.sides.lock();
        match side {
            Side::Buy => sides.bids.pop(),
            Side::Sell => sides.asks.pop(),
        }
    }

    /// Match the best bid against the best ask once
    ///
    /// Returns `Ok(None)` when a side is empty or the spread has not
    /// crossed. Otherwise both orders are decremented by the smaller
    /// remaining quantity, filled orders leave their heap, and a partially
    /// filled order stays on top for the next step.
    pub fn try_match(&self) -> Result<Option<MatchedOrder>, MatchError> {
        self.sides.lock().match_step(&self.ticker, &self.executor)
    }

    /// Up to `max_steps` match steps under a single lock acquisition
    ///
    /// Trades are appended to `out` even when a later step fails.
    pub fn match_burst(
        &self,
        max_steps: usize,
        out: &mut Vec<MatchedOrder>,
    ) -> Result<usize, MatchError> {
        let mut sides = self.sides.lock();
        let mut matched = 0;
        while matched < max_steps {
            match sides.match_step(&self.ticker, &self.executor)? {
                Some(trade) => {
                    out.push(trade);
                    matched += 1;
                }
                None => break,
            }
        }
        Ok(matched)
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.sides.lock().bids.peek().map(|o| o.price)
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.sides.lock().asks.peek().map(|o| o.price)
    }

    /// Best ask minus best bid; negative while a crossed pair waits for the loop
    pub fn spread(&self) -> Option<Decimal> {
        let mut sides = self.sides.lock();
        let bid = sides.bids.peek().map(|o| o.price)?;
        let ask = sides.asks.peek().map(|o| o.price)?;
        Some(ask.as_decimal() - bid.as_decimal())
    }

    /// Aggregated depth up to `levels` price levels per side
    pub fn depth(&self, levels: usize) -> Depth {
        let sides = self.sides.lock();
        Depth {
            bids: sides.bids.depth(levels),
            asks: sides.asks.depth(levels),
        }
    }

    /// Copy of all resting orders in priority order
    pub fn snapshot(&self) -> BookSnapshot {
        let sides = self.sides.lock();
        BookSnapshot {
            ticker: self.ticker.clone(),
            bids: sides.bids.sorted_orders(),
            asks: sides.asks.sorted_orders(),
        }
    }

    /// Remaining quantity resting on (bid, ask) sides
    pub fn resting_quantity(&self) -> (Quantity, Quantity) {
        let sides = self.sides.lock();
        (sides.bids.total_quantity(), sides.asks.total_quantity())
    }

    /// Number of heap entries across both sides
    pub fn len(&self) -> usize {
        let sides = self.sides.lock();
        sides.bids.len() + sides.asks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn book(policy: PricePolicy) -> OrderBook {
        OrderBook::new(TickerSymbol::new("AAPL"), policy)
    }

    fn order(side: Side, price: u64, qty: u64, timestamp: u64) -> Order {
        Order::new(
            TickerSymbol::new("AAPL"),
            side,
            Price::from_u64(price),
            Quantity::new(qty),
            timestamp,
            0,
        )
    }

    #[test]
    fn test_insert_routes_by_side() {
        let book = book(PricePolicy::SellOrder);
        book.insert(order(Side::Buy, 100, 10, 1));
        book.insert(order(Side::Sell, 105, 10, 2));

        assert_eq!(book.best_bid(), Some(Price::from_u64(100)));
        assert_eq!(book.best_ask(), Some(Price::from_u64(105)));
        assert_eq!(book.spread(), Some(Decimal::from(5)));
        assert_eq!(book.len(), 2);
    }

    #[test]
    fn test_pop_best_returns_next_eligible() {
        let book = book(PricePolicy::SellOrder);
        book.insert(order(Side::Sell, 100, 5, 1));
        book.insert(order(Side::Sell, 101, 5, 2));
        book.insert(order(Side::Buy, 100, 5, 3));
        book.try_match().unwrap().unwrap();

        let best = book.pop_best(Side::Sell).unwrap();
        assert_eq!(best.price, Price::from_u64(101));
        assert!(book.pop_best(Side::Sell).is_none());
        assert!(book.pop_best(Side::Buy).is_none());
    }

    #[test]
    fn test_no_match_with_empty_side() {
        let book = book(PricePolicy::SellOrder);
        assert_eq!(book.try_match().unwrap(), None);

        book.insert(order(Side::Buy, 100, 10, 1));
        assert_eq!(book.try_match().unwrap(), None);
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_no_match_when_spread_uncrossed() {
        let book = book(PricePolicy::SellOrder);
        book.insert(order(Side::Buy, 99, 10, 1));
        book.insert(order(Side::Sell, 100, 10, 2));

        let before = book.snapshot();
        assert_eq!(book.try_match().unwrap(), None);
        assert_eq!(book.snapshot(), before);
    }

    #[test]
    fn test_partial_fill_scenario() {
        let book = book(PricePolicy::SellOrder);
        let early_buy = order(Side::Buy, 100, 50, 1);
        let high_buy = order(Side::Buy, 101, 30, 2);
        let sell = order(Side::Sell, 99, 40, 3);
        let (early_id, high_id, sell_id) = (early_buy.order_id, high_buy.order_id, sell.order_id);
        book.insert(early_buy);
        book.insert(high_buy);
        book.insert(sell);

        // Higher bid has priority; sell keeps 10
        let first = book.try_match().unwrap().unwrap();
        assert_eq!(first.buy_order_id, high_id);
        assert_eq!(first.sell_order_id, sell_id);
        assert_eq!(first.execution_price, Price::from_u64(99));
        assert_eq!(first.executed_quantity, Quantity::new(30));
        assert_eq!(
            book.peek_best(Side::Sell).unwrap().remaining_quantity,
            Quantity::new(10)
        );

        // Remaining sell meets the earlier, lower bid
        let second = book.try_match().unwrap().unwrap();
        assert_eq!(second.buy_order_id, early_id);
        assert_eq!(second.executed_quantity, Quantity::new(10));

        let rest = book.peek_best(Side::Buy).unwrap();
        assert_eq!(rest.order_id, early_id);
        assert_eq!(rest.remaining_quantity, Quantity::new(40));
        assert!(book.peek_best(Side::Sell).is_none());
        assert_eq!(book.try_match().unwrap(), None);
    }

    #[test]
    fn test_equal_quantities_fill_both_sides() {
        let book = book(PricePolicy::SellOrder);
        book.insert(order(Side::Buy, 100, 25, 1));
        book.insert(order(Side::Sell, 100, 25, 2));

        let trade = book.try_match().unwrap().unwrap();
        assert_eq!(trade.executed_quantity, Quantity::new(25));
        assert!(book.is_empty());
    }

    #[test]
    fn test_resting_order_sets_price() {
        let book = book(PricePolicy::RestingOrder);
        book.insert(order(Side::Sell, 95, 10, 1));
        book.insert(order(Side::Buy, 100, 10, 2));

        let trade = book.try_match().unwrap().unwrap();
        assert_eq!(trade.execution_price, Price::from_u64(95));
        assert_eq!(trade.aggressor, Side::Buy);
    }

    #[test]
    fn test_earlier_bid_matches_first_at_same_price() {
        let book = book(PricePolicy::SellOrder);
        let late = order(Side::Buy, 100, 10, 7);
        let early = order(Side::Buy, 100, 10, 3);
        let early_id = early.order_id;
        book.insert(late);
        book.insert(early);
        book.insert(order(Side::Sell, 100, 10, 9));

        let trade = book.try_match().unwrap().unwrap();
        assert_eq!(trade.buy_order_id, early_id);
    }

    #[test]
    fn test_match_burst_respects_limit() {
        let book = book(PricePolicy::SellOrder);
        for ts in 1..=5 {
            book.insert(order(Side::Sell, 100, 1, ts));
        }
        book.insert(order(Side::Buy, 100, 5, 6));

        let mut trades = Vec::new();
        assert_eq!(book.match_burst(3, &mut trades).unwrap(), 3);
        assert_eq!(trades.len(), 3);
        assert_eq!(book.match_burst(10, &mut trades).unwrap(), 2);
        assert_eq!(book.match_burst(10, &mut trades).unwrap(), 0);
        assert!(book.is_empty());
    }

    #[test]
    fn test_insert_stamped_is_monotonic() {
        let book = book(PricePolicy::SellOrder);
        let clock = AtomicU64::new(0);
        let t1 = book.insert_stamped(order(Side::Buy, 100, 1, 0), &clock);
        let t2 = book.insert_stamped(order(Side::Buy, 100, 1, 0), &clock);
        assert_eq!((t1, t2), (1, 2));

        let snapshot = book.snapshot();
        assert_eq!(snapshot.bids[0].timestamp, 1);
        assert_eq!(snapshot.bids[1].timestamp, 2);
    }

    #[test]
    fn test_depth_and_snapshot_order() {
        let book = book(PricePolicy::SellOrder);
        book.insert(order(Side::Buy, 100, 3, 1));
        book.insert(order(Side::Buy, 101, 2, 2));
        book.insert(order(Side::Sell, 105, 4, 3));
        book.insert(order(Side::Sell, 105, 1, 4));

        let depth = book.depth(5);
        assert_eq!(depth.bids.len(), 2);
        assert_eq!(depth.bids[0].price, Price::from_u64(101));
        assert_eq!(depth.asks.len(), 1);
        assert_eq!(depth.asks[0].quantity, Quantity::new(5));

        let snapshot = book.snapshot();
        assert_eq!(snapshot.bids[0].price, Price::from_u64(101));
        assert_eq!(snapshot.resting_quantity(), Quantity::new(10));
        assert_eq!(book.resting_quantity(), (Quantity::new(5), Quantity::new(5)));
    }

    #[test]
    fn test_concurrent_inserts_same_book() {
        let book = Arc::new(book(PricePolicy::SellOrder));
        let clock = Arc::new(AtomicU64::new(0));

        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let book = Arc::clone(&book);
                let clock = Arc::clone(&clock);
                thread::spawn(move || {
                    let side = if worker % 2 == 0 { Side::Buy } else { Side::Sell };
                    let price = if side == Side::Buy { 90 } else { 110 };
                    for _ in 0..250 {
                        book.insert_stamped(order(side, price, 1, 0), &clock);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(book.len(), 1000);
        assert_eq!(book.resting_quantity(), (Quantity::new(500), Quantity::new(500)));

        let mut stamps: Vec<u64> = {
            let snapshot = book.snapshot();
            snapshot
                .bids
                .iter()
                .chain(snapshot.asks.iter())
                .map(|o| o.timestamp)
                .collect()
        };
        stamps.sort_unstable();
        stamps.dedup();
        assert_eq!(stamps.len(), 1000, "arrival stamps must be unique");
    }
}
