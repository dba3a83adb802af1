//! Verify module: medicine authenticity checks, query logging and reports.
//!
//! A scanned code is looked up as a batch number first, then as a serial
//! number, and classified as `AUTHENTIC`, `EXPIRED` or `COUNTERFEIT`.
//! Every check can be logged; administrators aggregate the log per serial
//! and export it, together with incident reports, as PDF.
//!
//! ```ignore
//! let records = Arc::new(SqlRecordStore::new(sql, Tables::default())?);
//! let module = VerifyModule::new(VerifyService::new(records, VerifyConfig::default()));
//! let app = auth.with_session(module.routes().merge(auth.routes()));
//! ```

pub mod api;
pub mod model;
pub mod report;
pub mod service;
pub mod store;

use std::sync::Arc;

use axum::Router;

use pharmacheck_core::Module;

use crate::service::VerifyService;

pub use model::VerificationStatus;
pub use service::{Verification, VerifyConfig};

/// Verify module implementing the Module trait.
pub struct VerifyModule {
    service: Arc<VerifyService>,
}

impl VerifyModule {
    pub fn new(service: VerifyService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    pub fn service(&self) -> &Arc<VerifyService> {
        &self.service
    }
}

impl Module for VerifyModule {
    fn name(&self) -> &str {
        "verify"
    }

    fn routes(&self) -> Router {
        api::router(self.service.clone())
    }
}
