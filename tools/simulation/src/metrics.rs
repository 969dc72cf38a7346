//! Performance metrics for simulation
//!
//! Tracks submissions, trades, per-ticker volume, submission latency
//! histograms, and throughput.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use types::trade::MatchedOrder;

use crate::broker::Submission;

/// Latency histogram bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyBucket {
    pub label: String,
    pub lower_ns: u64,
    pub upper_ns: u64,
    pub count: u64,
}

/// Traded volume of one ticker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerVolume {
    pub trades: u64,
    pub shares: u64,
    pub notional: Decimal,
}

/// Aggregated simulation metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimMetrics {
    pub orders_submitted: u64,
    pub orders_accepted: u64,
    pub orders_rejected: u64,
    pub total_trades: u64,
    pub total_shares: u64,
    pub total_notional: Decimal,
    pub per_ticker: BTreeMap<String, TickerVolume>,
    pub latency_buckets: Vec<LatencyBucket>,
    pub elapsed_ns: u64,
}

impl SimMetrics {
    /// Create empty metrics with default latency buckets.
    pub fn new() -> Self {
        Self {
            orders_submitted: 0,
            orders_accepted: 0,
            orders_rejected: 0,
            total_trades: 0,
            total_shares: 0,
            total_notional: Decimal::ZERO,
            per_ticker: BTreeMap::new(),
            latency_buckets: default_buckets(),
            elapsed_ns: 0,
        }
    }

    /// Record one broker submission.
    pub fn record_submission(&mut self, submission: &Submission) {
        self.orders_submitted += 1;
        if submission.result.is_ok() {
            self.orders_accepted += 1;
        } else {
            self.orders_rejected += 1;
        }
        self.record_latency(submission.latency_ns);
    }

    /// Record one matched trade.
    pub fn record_trade(&mut self, trade: &MatchedOrder) {
        let shares = trade.executed_quantity.as_u64();
        let notional = trade.trade_value();

        self.total_trades += 1;
        self.total_shares = self.total_shares.saturating_add(shares);
        self.total_notional = self.total_notional.saturating_add(notional);

        let entry = self
            .per_ticker
            .entry(trade.ticker_symbol.to_string())
            .or_default();
        entry.trades += 1;
        entry.shares = entry.shares.saturating_add(shares);
        entry.notional = entry.notional.saturating_add(notional);
    }

    /// Record latency in nanoseconds.
    pub fn record_latency(&mut self, latency_ns: u64) {
        for bucket in &mut self.latency_buckets {
            if latency_ns >= bucket.lower_ns && latency_ns < bucket.upper_ns {
                bucket.count += 1;
                return;
            }
        }
        // Overflow bucket (last)
        if let Some(last) = self.latency_buckets.last_mut() {
            last.count += 1;
        }
    }

    pub fn set_elapsed(&mut self, ns: u64) {
        self.elapsed_ns = ns;
    }

    /// Fold another run's metrics into this one; elapsed time is the max.
    pub fn merge(&mut self, other: &SimMetrics) {
        self.orders_submitted += other.orders_submitted;
        self.orders_accepted += other.orders_accepted;
        self.orders_rejected += other.orders_rejected;
        self.total_trades += other.total_trades;
        self.total_shares = self.total_shares.saturating_add(other.total_shares);
        self.total_notional = self.total_notional.saturating_add(other.total_notional);
        for (ticker, volume) in &other.per_ticker {
            let entry = self.per_ticker.entry(ticker.clone()).or_default();
            entry.trades += volume.trades;
            entry.shares = entry.shares.saturating_add(volume.shares);
            entry.notional = entry.notional.saturating_add(volume.notional);
        }
        for (mine, theirs) in self.latency_buckets.iter_mut().zip(&other.latency_buckets) {
            mine.count += theirs.count;
        }
        self.elapsed_ns = self.elapsed_ns.max(other.elapsed_ns);
    }

    /// Throughput: orders per second.
    pub fn orders_per_second(&self) -> f64 {
        if self.elapsed_ns == 0 {
            return 0.0;
        }
        self.orders_submitted as f64 / (self.elapsed_ns as f64 / 1_000_000_000.0)
    }

    /// Throughput: trades per second.
    pub fn trades_per_second(&self) -> f64 {
        if self.elapsed_ns == 0 {
            return 0.0;
        }
        self.total_trades as f64 / (self.elapsed_ns as f64 / 1_000_000_000.0)
    }

    pub fn summary(&self) -> String {
        format!(
            "Orders: {} | Rejected: {} | Trades: {} | Shares: {} | Notional: {} | Throughput: {:.0} orders/s",
            self.orders_submitted,
            self.orders_rejected,
            self.total_trades,
            self.total_shares,
            self.total_notional,
            self.orders_per_second(),
        )
    }
}

impl Default for SimMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Default latency histogram buckets.
fn default_buckets() -> Vec<LatencyBucket> {
    vec![
        LatencyBucket { label: "<1μs".into(), lower_ns: 0, upper_ns: 1_000, count: 0 },
        LatencyBucket { label: "1-10μs".into(), lower_ns: 1_000, upper_ns: 10_000, count: 0 },
        LatencyBucket { label: "10-100μs".into(), lower_ns: 10_000, upper_ns: 100_000, count: 0 },
        LatencyBucket { label: "100μs-1ms".into(), lower_ns: 100_000, upper_ns: 1_000_000, count: 0 },
        LatencyBucket { label: ">1ms".into(), lower_ns: 1_000_000, upper_ns: u64::MAX, count: 0 },
    ]
}
