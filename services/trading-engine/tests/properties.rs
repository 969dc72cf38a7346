//! Property tests for matching and the ticker index
//!
//! Orders are generated as arbitrary sequences and drained synchronously
//! with `match_until_idle`, so every run is deterministic.

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use trading_engine::{EngineConfig, TradingEngine};
use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::Side;

#[derive(Debug, Clone)]
struct Submission {
    ticker: usize,
    side: Side,
    price: u64,
    quantity: u64,
}

fn submission() -> impl Strategy<Value = Submission> {
    (0..3usize, any::<bool>(), 90..110u64, 1..100u64).prop_map(|(ticker, buy, price, quantity)| {
        Submission {
            ticker,
            side: if buy { Side::Buy } else { Side::Sell },
            price,
            quantity,
        }
    })
}

const TICKERS: [&str; 3] = ["AAPL", "MSFT", "IBM"];

proptest! {
    #[test]
    fn prop_quantity_is_conserved(orders in prop::collection::vec(submission(), 1..120)) {
        let engine = TradingEngine::new(EngineConfig::default()).unwrap();
        let mut original: HashMap<OrderId, u64> = HashMap::new();
        for s in &orders {
            let handle = engine
                .add_order(TICKERS[s.ticker], s.side, Price::from_u64(s.price), Quantity::new(s.quantity))
                .unwrap();
            original.insert(handle.order_id, s.quantity);
        }
        engine.match_until_idle();

        let mut filled: HashMap<OrderId, u64> = HashMap::new();
        for trade in engine.matched_trades() {
            *filled.entry(trade.buy_order_id).or_default() += trade.executed_quantity.as_u64();
            *filled.entry(trade.sell_order_id).or_default() += trade.executed_quantity.as_u64();
        }

        let mut remaining: HashMap<OrderId, u64> = HashMap::new();
        for ticker in TICKERS {
            if let Some(snapshot) = engine.book_snapshot(ticker) {
                for order in snapshot.bids.iter().chain(snapshot.asks.iter()) {
                    prop_assert!(order.check_invariant());
                    remaining.insert(order.order_id, order.remaining_quantity.as_u64());
                }
            }
        }

        for (id, qty) in &original {
            let done = filled.get(id).copied().unwrap_or(0);
            let left = remaining.get(id).copied().unwrap_or(0);
            prop_assert_eq!(done + left, *qty);
        }
    }

    #[test]
    fn prop_trades_only_when_crossed(orders in prop::collection::vec(submission(), 1..120)) {
        let engine = TradingEngine::new(EngineConfig::default()).unwrap();
        let mut limits: HashMap<OrderId, u64> = HashMap::new();
        for s in &orders {
            let handle = engine
                .add_order(TICKERS[s.ticker], s.side, Price::from_u64(s.price), Quantity::new(s.quantity))
                .unwrap();
            limits.insert(handle.order_id, s.price);
        }
        engine.match_until_idle();

        for trade in engine.matched_trades() {
            let bid = limits[&trade.buy_order_id];
            let ask = limits[&trade.sell_order_id];
            prop_assert!(bid >= ask);
            // Sell-side pricing by default
            prop_assert_eq!(trade.execution_price, Price::from_u64(ask));
        }

        for ticker in TICKERS {
            if let (Some(bid), Some(ask)) = (
                engine.peek_best(ticker, Side::Buy),
                engine.peek_best(ticker, Side::Sell),
            ) {
                prop_assert!(bid.price < ask.price);
            }
        }
    }

    #[test]
    fn prop_uncrossed_book_never_matches(
        bids in prop::collection::vec((1..50u64, 1..100u64), 0..40),
        asks in prop::collection::vec((50..100u64, 1..100u64), 0..40),
    ) {
        // Every bid is strictly below every ask
        let engine = TradingEngine::new(EngineConfig::default()).unwrap();
        for (price, qty) in &bids {
            engine.add_order("AAPL", Side::Buy, Price::from_u64(*price), Quantity::new(*qty)).unwrap();
        }
        for (price, qty) in &asks {
            engine.add_order("AAPL", Side::Sell, Price::from_u64(*price), Quantity::new(*qty)).unwrap();
        }

        prop_assert_eq!(engine.match_until_idle(), 0);
        prop_assert_eq!(engine.trade_count(), 0);
    }

    #[test]
    fn prop_same_price_fills_in_arrival_order(
        sizes in prop::collection::vec(1..50u64, 1..30),
    ) {
        let engine = TradingEngine::new(EngineConfig::default()).unwrap();
        let sells: Vec<OrderId> = sizes
            .iter()
            .map(|qty| {
                engine
                    .add_order("AAPL", Side::Sell, Price::from_u64(100), Quantity::new(*qty))
                    .unwrap()
                    .order_id
            })
            .collect();
        let total: u64 = sizes.iter().sum();
        engine.add_order("AAPL", Side::Buy, Price::from_u64(100), Quantity::new(total)).unwrap();

        engine.match_until_idle();
        let filled: Vec<OrderId> = engine.matched_trades().iter().map(|t| t.sell_order_id).collect();
        prop_assert_eq!(filled, sells);
    }

    #[test]
    fn prop_better_price_always_first(
        prices in prop::collection::vec(1..1000u64, 2..30),
    ) {
        let engine = TradingEngine::new(EngineConfig::default()).unwrap();
        let mut limits: HashMap<OrderId, u64> = HashMap::new();
        for price in &prices {
            let handle = engine
                .add_order("MSFT", Side::Buy, Price::from_u64(*price), Quantity::new(1))
                .unwrap();
            limits.insert(handle.order_id, *price);
        }
        let best = prices.iter().max().copied().unwrap();
        prop_assert_eq!(engine.peek_best("MSFT", Side::Buy).unwrap().price, Price::from_u64(best));

        engine.add_order("MSFT", Side::Sell, Price::from_u64(1), Quantity::new(prices.len() as u64)).unwrap();
        engine.match_until_idle();

        let filled: Vec<u64> = engine
            .matched_trades()
            .iter()
            .map(|t| limits[&t.buy_order_id])
            .collect();
        prop_assert_eq!(filled.len(), prices.len());
        prop_assert!(filled.windows(2).all(|pair| pair[0] >= pair[1]));
        prop_assert!(engine.peek_best("MSFT", Side::Buy).is_none());
    }

    #[test]
    fn prop_ticker_slots_are_stable(
        symbols in prop::collection::hash_set("[A-Z]{1,5}", 1..60),
    ) {
        let engine = TradingEngine::new(EngineConfig::with_capacity(64)).unwrap();
        let first: Vec<usize> = symbols.iter().map(|s| engine.register_ticker(s).unwrap()).collect();
        let second: Vec<usize> = symbols.iter().map(|s| engine.register_ticker(s).unwrap()).collect();
        prop_assert_eq!(&first, &second);

        let distinct: HashSet<usize> = first.iter().copied().collect();
        prop_assert_eq!(distinct.len(), symbols.len());
        for (symbol, slot) in symbols.iter().zip(&first) {
            prop_assert_eq!(engine.lookup_ticker(symbol).unwrap(), *slot);
        }
    }
}

#[test]
fn test_default_capacity_admits_1600_tickers() {
    let engine = TradingEngine::new(EngineConfig::default()).unwrap();
    for i in 0..1600 {
        engine
            .add_order(&format!("TK{i}"), Side::Buy, Price::from_u64(1), Quantity::new(1))
            .unwrap();
    }

    let err = engine
        .add_order("TK1600", Side::Buy, Price::from_u64(1), Quantity::new(1))
        .unwrap_err();
    assert!(err.is_capacity_exceeded());
    assert_eq!(engine.registered_tickers().len(), 1600);
}
