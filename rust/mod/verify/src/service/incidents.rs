use pharmacheck_core::{DateRange, ServiceError};

use crate::model::{IncidentForm, IncidentReport, IncidentRow};
use crate::service::VerifyService;

impl VerifyService {
    /// File an incident report. Product, batch/serial, location and
    /// description are required; reporter name and email are optional.
    pub async fn submit_incident(&self, form: IncidentForm) -> Result<IncidentReport, ServiceError> {
        let (Some(product_name), Some(batch_serial), Some(location), Some(description)) = (
            filled(form.product_name),
            filled(form.batch_serial),
            filled(form.location),
            filled(form.description),
        ) else {
            return Err(ServiceError::Validation("Missing required fields".into()));
        };

        let report = IncidentReport {
            product_name,
            batch_serial,
            location,
            description,
            reporter_name: filled(form.reporter_name),
            reporter_email: filled(form.reporter_email),
            created_at: pharmacheck_core::now_utc(),
        };
        let stored = self.store.insert_incident(&report).await?;
        tracing::info!(code = %stored.batch_serial, location = %stored.location, "incident reported");
        Ok(stored)
    }

    /// Incidents filed inside `range`, oldest first.
    pub async fn incident_rows(&self, range: &DateRange) -> Result<Vec<IncidentRow>, ServiceError> {
        let mut reports = self
            .store
            .incidents_between(range.lower_bound(), range.upper_bound())
            .await?;
        reports.retain(|r| range.contains(&r.created_at));
        reports.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(reports.iter().map(IncidentRow::from).collect())
    }
}

fn filled(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
