//! Report export
//!
//! Serializes a SimulationReport, optionally with the full trade log, to
//! JSON for external consumption.

use serde::{Deserialize, Serialize};
use std::path::Path;
use types::trade::MatchedOrder;

use crate::runner::SimulationReport;

/// Report plus the trades it summarizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationExport {
    pub report: SimulationReport,
    pub trade_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trades: Vec<MatchedOrder>,
}

/// Build an export; pass an empty slice to leave the trades out.
pub fn build_export(report: &SimulationReport, trades: &[MatchedOrder]) -> SimulationExport {
    SimulationExport {
        report: report.clone(),
        trade_count: report.metrics.total_trades as usize,
        trades: trades.to_vec(),
    }
}

pub fn export_json(export: &SimulationExport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(export)
}

/// Write export to a file path.
pub fn write_to_file(export: &SimulationExport, path: impl AsRef<Path>) -> std::io::Result<()> {
    let json = export_json(export).map_err(std::io::Error::other)?;
    std::fs::write(path, json)
}
