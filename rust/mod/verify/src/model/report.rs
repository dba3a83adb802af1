use serde::{Deserialize, Serialize};

/// Per-serial roll-up of query logs.
///
/// Also the shape the PDF endpoint accepts back from the client, so every
/// field defaults when missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportRow {
    pub serial: String,
    pub total_queries: u64,
    pub authentic_count: u64,
    pub counterfeit_count: u64,
    pub expired_count: u64,
    pub other_count: u64,
    /// Latest query, `YYYY-MM-DD HH:MM:SS`.
    pub last_query_timestamp: Option<String>,
}

/// Totals across all serials. Statuses outside the canonical three count
/// toward no status bucket here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_queries: u64,
    pub authentic_count: u64,
    pub counterfeit_count: u64,
    pub expired_count: u64,
}
