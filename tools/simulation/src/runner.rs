//! Multi-broker simulation
//!
//! Broker threads submit random orders to one shared engine while its
//! matching loop runs. When every broker is done the loop is stopped, the
//! books are optionally drained, and the run is summarized in a
//! [`SimulationReport`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use trading_engine::{EngineConfig, StatsSnapshot, TradingEngine};
use types::errors::EngineError;
use types::ids::OrderId;

use crate::broker::{Broker, BrokerConfig};
use crate::metrics::SimMetrics;

/// Parameters of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub brokers: usize,
    pub orders_per_broker: usize,
    /// Broker `i` uses seed `seed + i`
    pub seed: u64,
    /// Pause between two submissions of one broker, in microseconds
    pub submit_delay_us: u64,
    /// Match whatever is still crossed after the loop stops
    pub drain_on_stop: bool,
    pub broker: BrokerConfig,
    pub engine: EngineConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            brokers: 5,
            orders_per_broker: 1_000,
            seed: 42,
            submit_delay_us: 0,
            drain_on_stop: true,
            broker: BrokerConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub version: String,
    pub brokers: usize,
    pub metrics: SimMetrics,
    pub engine_stats: StatsSnapshot,
    /// Orders with some quantity still resting after the run
    pub resting_orders: usize,
    /// Every accepted order satisfies filled + remaining == original
    pub conservation_ok: bool,
    /// No registered book ended with best bid >= best ask
    pub books_uncrossed: bool,
}

/// Per-broker result handed back to the coordinator.
struct BrokerRun {
    metrics: SimMetrics,
    accepted: Vec<(OrderId, u64)>,
}

/// Run a full simulation and summarize it.
pub fn run_simulation(config: &SimulationConfig) -> Result<SimulationReport, EngineError> {
    let engine = TradingEngine::with_tickers(config.engine.clone(), &config.broker.tickers)?;
    info!(
        brokers = config.brokers,
        orders_per_broker = config.orders_per_broker,
        tickers = config.broker.tickers.len(),
        "Starting simulation"
    );

    let started = Instant::now();
    engine.start()?;

    let runs: Vec<BrokerRun> = thread::scope(|scope| {
        let handles: Vec<_> = (0..config.brokers)
            .map(|broker_id| {
                let engine = &engine;
                scope.spawn(move || run_broker(engine, config, broker_id))
            })
            .collect();

        handles
            .into_iter()
            .filter_map(|handle| match handle.join() {
                Ok(run) => Some(run),
                Err(_) => {
                    warn!("Broker thread panicked");
                    None
                }
            })
            .collect()
    });

    engine.stop();
    if config.drain_on_stop {
        engine.match_until_idle();
    }

    let mut metrics = SimMetrics::new();
    let mut accepted = Vec::new();
    for run in runs {
        metrics.merge(&run.metrics);
        accepted.extend(run.accepted);
    }
    for trade in engine.matched_trades() {
        metrics.record_trade(&trade);
    }
    metrics.set_elapsed(started.elapsed().as_nanos() as u64);

    let report = summarize(&engine, config.brokers, metrics, &accepted);
    info!(
        summary = %report.metrics.summary(),
        conservation_ok = report.conservation_ok,
        books_uncrossed = report.books_uncrossed,
        "Simulation finished"
    );
    Ok(report)
}

fn run_broker(engine: &TradingEngine, config: &SimulationConfig, broker_id: usize) -> BrokerRun {
    let seed = config.seed.wrapping_add(broker_id as u64);
    let mut broker = Broker::new(broker_id, config.broker.clone(), seed);
    let mut metrics = SimMetrics::new();
    let mut accepted = Vec::with_capacity(config.orders_per_broker);
    let delay = Duration::from_micros(config.submit_delay_us);

    for _ in 0..config.orders_per_broker {
        let Some(submission) = broker.tick(engine) else {
            break;
        };
        metrics.record_submission(&submission);
        if let Ok(handle) = &submission.result {
            accepted.push((handle.order_id, submission.order.quantity.as_u64()));
        }
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    BrokerRun { metrics, accepted }
}

fn summarize(
    engine: &TradingEngine,
    brokers: usize,
    metrics: SimMetrics,
    accepted: &[(OrderId, u64)],
) -> SimulationReport {
    let mut filled: HashMap<OrderId, u64> = HashMap::new();
    for trade in engine.matched_trades() {
        let shares = trade.executed_quantity.as_u64();
        *filled.entry(trade.buy_order_id).or_default() += shares;
        *filled.entry(trade.sell_order_id).or_default() += shares;
    }

    let mut remaining: HashMap<OrderId, u64> = HashMap::new();
    let mut books_uncrossed = true;
    for ticker in engine.registered_tickers() {
        let Some(snapshot) = engine.book_snapshot(ticker.as_str()) else {
            continue;
        };
        if let (Some(bid), Some(ask)) = (snapshot.bids.first(), snapshot.asks.first()) {
            if bid.price >= ask.price {
                books_uncrossed = false;
            }
        }
        for order in snapshot.bids.iter().chain(snapshot.asks.iter()) {
            remaining.insert(order.order_id, order.remaining_quantity.as_u64());
        }
    }

    let conservation_ok = accepted.iter().all(|(order_id, quantity)| {
        let done = filled.get(order_id).copied().unwrap_or(0);
        let left = remaining.get(order_id).copied().unwrap_or(0);
        done + left == *quantity
    });

    SimulationReport {
        version: crate::VERSION.to_string(),
        brokers,
        metrics,
        engine_stats: engine.stats(),
        resting_orders: remaining.len(),
        conservation_ok,
        books_uncrossed,
    }
}
