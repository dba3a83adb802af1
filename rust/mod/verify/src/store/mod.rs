//! Record store gateway.
//!
//! One async trait over the five tables the service reads and appends to.
//! [`SqlRecordStore`] keeps them in the embedded database;
//! [`RestRecordStore`] talks to a PostgREST deployment.

mod rest;
mod sql;

pub use rest::RestRecordStore;
pub use sql::SqlRecordStore;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Deserialize;
use thiserror::Error;

use pharmacheck_core::ServiceError;

use crate::model::{BatchRecord, IncidentReport, QueryLog, SerialRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    /// Duplicate key on insert.
    #[error("{0}")]
    Conflict(String),

    /// Backend unreachable after retries.
    #[error("record store unavailable: {0}")]
    Unavailable(String),

    #[error("record store error: {0}")]
    Backend(String),

    /// A stored row could not be read back.
    #[error("malformed record: {0}")]
    Decode(String),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(m) => ServiceError::Conflict(m),
            StoreError::Unavailable(_) => ServiceError::Unavailable(e.to_string()),
            StoreError::Backend(_) | StoreError::Decode(_) => ServiceError::Storage(e.to_string()),
        }
    }
}

/// Table names. Defaults match the hosted Supabase project.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Tables {
    pub batches: String,
    pub serials: String,
    pub query_logs: String,
    pub incidents: String,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            batches: "AMOXICILLIN_BATCH".into(),
            serials: "AMOXICILLIN_SERIAL".into(),
            query_logs: "pharmlogs".into(),
            incidents: "report_page".into(),
        }
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn batch_by_number(&self, batch_number: &str) -> Result<Option<BatchRecord>, StoreError>;

    async fn serial_by_number(&self, serial_no: &str) -> Result<Option<SerialRecord>, StoreError>;

    async fn insert_batch(&self, batch: &BatchRecord) -> Result<(), StoreError>;

    async fn insert_serial(&self, serial: &SerialRecord) -> Result<(), StoreError>;

    async fn append_log(&self, log: &QueryLog) -> Result<(), StoreError>;

    /// Logs with `from <= timestamp <= to`, in no particular order.
    async fn logs_between(&self, from: NaiveDateTime, to: NaiveDateTime) -> Result<Vec<QueryLog>, StoreError>;

    /// Append an incident and return it as stored.
    async fn insert_incident(&self, report: &IncidentReport) -> Result<IncidentReport, StoreError>;

    /// Incidents with `from <= created_at <= to`.
    async fn incidents_between(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<IncidentReport>, StoreError>;
}

/// Range-bound format shared by both backends. Fixed-width, so text
/// comparison in SQLite orders the same way as time.
pub(crate) fn bound(ts: &NaiveDateTime) -> String {
    ts.format(pharmacheck_core::types::STORAGE_FORMAT).to_string()
}
