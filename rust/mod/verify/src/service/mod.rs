pub mod aggregate;
pub mod incidents;
pub mod records;
pub mod resolver;

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::store::RecordStore;

pub use aggregate::aggregate;
pub use resolver::{Match, Verification};

/// Verification settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Append a query log after every verification. Best-effort.
    pub record_queries: bool,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self { record_queries: true }
    }
}

/// Records, verification and reporting over a [`RecordStore`].
pub struct VerifyService {
    pub(crate) store: Arc<dyn RecordStore>,
    pub(crate) config: VerifyConfig,
    today: fn() -> NaiveDate,
}

impl VerifyService {
    pub fn new(store: Arc<dyn RecordStore>, config: VerifyConfig) -> Self {
        Self {
            store,
            config,
            today: local_today,
        }
    }

    /// Replace the calendar used for expiry checks.
    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn today(&self) -> NaiveDate {
        (self.today)()
    }
}

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
