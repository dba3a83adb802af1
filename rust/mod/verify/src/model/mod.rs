mod incident;
mod log;
mod record;
mod report;
mod status;

pub use incident::{IncidentForm, IncidentReport, IncidentRow};
pub use log::{LogEntry, QueryLog};
pub use record::{BatchForm, BatchRecord, SerialForm, SerialRecord};
pub use report::{ReportRow, ReportSummary};
pub use status::VerificationStatus;
