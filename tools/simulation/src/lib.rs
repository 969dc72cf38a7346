//! Trading Simulation Driver
//!
//! Drives the trading engine with concurrent random order flow and checks
//! the outcome: every accepted order conserves its quantity and no book is
//! left crossed.
//!
//! # Modules
//! - `broker`: Seeded random order generators
//! - `metrics`: Submission, trade, and latency counters
//! - `runner`: Multi-broker concurrent simulation and its report
//! - `export`: Report JSON export

pub mod broker;
pub mod metrics;
pub mod runner;
pub mod export;

pub use runner::{run_simulation, SimulationConfig, SimulationReport};

/// Crate version constant
pub const VERSION: &str = "1.0.0";
