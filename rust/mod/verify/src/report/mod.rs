//! Tabular report documents.
//!
//! A [`Document`] is the layout-free description of a report: title,
//! period, summary lines and a table. [`Document::to_pdf`] lays it out on
//! Letter pages.

mod pdf;

use thiserror::Error;

use pharmacheck_core::ServiceError;

use crate::model::{IncidentRow, ReportRow};

pub const BRAND: &str = "Pharmacheck";
pub const NO_DATA: &str = "No data available for the selected time frame.";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("document has no columns")]
    NoColumns,

    #[error("row {row} has {got} cells, expected {expected}")]
    RowWidth { row: usize, got: usize, expected: usize },
}

impl From<RenderError> for ServiceError {
    fn from(e: RenderError) -> Self {
        ServiceError::Render(format!("failed to generate PDF: {e}"))
    }
}

/// A table column: header text and relative width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub header: &'static str,
    pub weight: f32,
}

const fn col(header: &'static str, weight: f32) -> Column {
    Column { header, weight }
}

pub const QUERY_LOG_COLUMNS: [Column; 6] = [
    col("Serial No.", 2.2),
    col("Total Queries", 1.2),
    col("Authentic Count", 1.3),
    col("Counterfeit Count", 1.45),
    col("Expired Count", 1.2),
    col("Last Query", 2.0),
];

pub const INCIDENT_COLUMNS: [Column; 6] = [
    col("Product Name", 1.6),
    col("Batch/Serial No", 1.4),
    col("Location", 1.2),
    col("Description", 2.4),
    col("Email", 1.8),
    col("Created At", 1.6),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    /// `Period: <start> to <end>`.
    pub period: String,
    /// `(label, value)` lines shown above the table.
    pub summary: Vec<(String, String)>,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

impl Document {
    pub fn headers(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.header).collect()
    }

    /// An empty document renders [`NO_DATA`] instead of a table.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn check(&self) -> Result<(), RenderError> {
        if self.columns.is_empty() {
            return Err(RenderError::NoColumns);
        }
        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != self.columns.len() {
                return Err(RenderError::RowWidth {
                    row: i,
                    got: row.len(),
                    expected: self.columns.len(),
                });
            }
        }
        Ok(())
    }

    pub fn to_pdf(&self) -> Result<Vec<u8>, RenderError> {
        self.check()?;
        Ok(pdf::render(self))
    }
}

pub fn period_label(start: Option<&str>, end: Option<&str>) -> String {
    format!("Period: {} to {}", or_na(start), or_na(end))
}

/// The query-log report. Summary counts are summed from `rows`.
pub fn query_log_report(rows: &[ReportRow], start: Option<&str>, end: Option<&str>) -> Document {
    let sum = |f: fn(&ReportRow) -> u64| rows.iter().map(f).sum::<u64>().to_string();
    Document {
        title: "Pharmacy Query Log Report".into(),
        period: period_label(start, end),
        summary: vec![
            ("Total Queries".into(), sum(|r| r.total_queries)),
            ("Authentic Queries".into(), sum(|r| r.authentic_count)),
            ("Counterfeit Queries".into(), sum(|r| r.counterfeit_count)),
            ("Expired Queries".into(), sum(|r| r.expired_count)),
        ],
        columns: QUERY_LOG_COLUMNS.to_vec(),
        rows: rows
            .iter()
            .map(|r| {
                vec![
                    r.serial.clone(),
                    r.total_queries.to_string(),
                    r.authentic_count.to_string(),
                    r.counterfeit_count.to_string(),
                    r.expired_count.to_string(),
                    r.last_query_timestamp.clone().unwrap_or_default(),
                ]
            })
            .collect(),
    }
}

pub fn incident_export(rows: &[IncidentRow], start: Option<&str>, end: Option<&str>) -> Document {
    Document {
        title: "Incident Report Export".into(),
        period: period_label(start, end),
        summary: vec![("Total Reports".into(), rows.len().to_string())],
        columns: INCIDENT_COLUMNS.to_vec(),
        rows: rows
            .iter()
            .map(|r| {
                vec![
                    r.product_name.clone(),
                    r.batch_serial.clone(),
                    r.location.clone(),
                    r.description.clone(),
                    r.email.clone().unwrap_or_default(),
                    r.created_at.clone(),
                ]
            })
            .collect(),
    }
}

pub fn query_log_file_name(start: Option<&str>, end: Option<&str>) -> String {
    format!("pharm_log_report_{}_to_{}.pdf", file_part(start), file_part(end))
}

pub fn incident_file_name(start: Option<&str>, end: Option<&str>) -> String {
    format!("report_page_{}_to_{}.pdf", file_part(start), file_part(end))
}

fn or_na(v: Option<&str>) -> &str {
    v.map(str::trim).filter(|s| !s.is_empty()).unwrap_or("N/A")
}

/// Keep file names header-safe: anything but `[A-Za-z0-9-_.]` becomes `_`.
fn file_part(v: Option<&str>) -> String {
    or_na(v)
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
        .collect()
}
