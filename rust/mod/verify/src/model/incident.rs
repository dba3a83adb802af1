use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A suspected-counterfeit report filed by a pharmacist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentReport {
    pub product_name: String,
    pub batch_serial: String,
    pub location: String,
    pub description: String,
    #[serde(rename = "name", default, skip_serializing_if = "Option::is_none")]
    pub reporter_name: Option<String>,
    #[serde(rename = "email", default, skip_serializing_if = "Option::is_none")]
    pub reporter_email: Option<String>,
    #[serde(with = "pharmacheck_core::types::timestamp")]
    pub created_at: NaiveDateTime,
}

/// `form_data` of `POST /api/report`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IncidentForm {
    pub product_name: Option<String>,
    pub batch_serial: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub reporter_name: Option<String>,
    pub reporter_email: Option<String>,
}

/// Incident as listed by `GET /api/report2` and accepted back by the
/// export endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncidentRow {
    pub product_name: String,
    pub batch_serial: String,
    pub location: String,
    pub description: String,
    pub email: Option<String>,
    /// `YYYY-MM-DD HH:MM:SS`.
    pub created_at: String,
}

impl From<&IncidentReport> for IncidentRow {
    fn from(r: &IncidentReport) -> Self {
        Self {
            product_name: r.product_name.clone(),
            batch_serial: r.batch_serial.clone(),
            location: r.location.clone(),
            description: r.description.clone(),
            email: r.reporter_email.clone(),
            created_at: pharmacheck_core::format_timestamp(&r.created_at),
        }
    }
}
