//! Engine counters
//!
//! Plain atomics, updated with relaxed ordering; a snapshot is a
//! best-effort reading, not a consistent cut.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct EngineStats {
    orders_accepted: AtomicU64,
    orders_rejected: AtomicU64,
    matches: AtomicU64,
    scans: AtomicU64,
    book_anomalies: AtomicU64,
}

/// Point-in-time reading of [`EngineStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub orders_accepted: u64,
    pub orders_rejected: u64,
    pub matches: u64,
    pub scans: u64,
    pub book_anomalies: u64,
}

impl EngineStats {
    pub fn record_accepted(&self) {
        self.orders_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.orders_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_scan(&self, matches: usize) {
        self.scans.fetch_add(1, Ordering::Relaxed);
        self.matches.fetch_add(matches as u64, Ordering::Relaxed);
    }

    pub fn record_anomaly(&self) {
        self.book_anomalies.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            orders_accepted: self.orders_accepted.load(Ordering::Relaxed),
            orders_rejected: self.orders_rejected.load(Ordering::Relaxed),
            matches: self.matches.load(Ordering::Relaxed),
            scans: self.scans.load(Ordering::Relaxed),
            book_anomalies: self.book_anomalies.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let stats = EngineStats::default();
        stats.record_accepted();
        stats.record_accepted();
        stats.record_rejected();
        stats.record_scan(3);
        stats.record_scan(0);
        stats.record_anomaly();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.orders_accepted, 2);
        assert_eq!(snapshot.orders_rejected, 1);
        assert_eq!(snapshot.matches, 3);
        assert_eq!(snapshot.scans, 2);
        assert_eq!(snapshot.book_anomalies, 1);
    }
}
