use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One verification attempt. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryLog {
    #[serde(default)]
    pub user_id: Option<String>,
    /// The code as submitted.
    pub serial: String,
    /// Stored as submitted; usually one of the canonical statuses.
    pub status: String,
    #[serde(with = "pharmacheck_core::types::timestamp")]
    pub timestamp: NaiveDateTime,
}

/// Body of `POST /api/log`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}
