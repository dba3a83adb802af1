use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::ServiceError;

/// Storage format for timestamps. Fixed-width so lexicographic order in
/// TEXT columns equals chronological order.
pub const STORAGE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Display format used in reports.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Generate a new random ID (UUIDv4, no dashes).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string().replace('-', "")
}

/// Current UTC wall-clock time without offset.
pub fn now_utc() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Parse a timestamp in any of the forms clients and stores produce.
///
/// Offsets are normalised to UTC. Accepted:
/// - RFC 3339 (`2025-01-05T10:00:00Z`, `2025-01-05T10:00:00.123+02:00`)
/// - `2025-01-05T10:00:00[.fff]`
/// - `2025-01-05 10:00:00[.fff]`
/// - `2025-01-05T10:00` (HTML datetime-local)
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    // Postgres sometimes renders `+00` without minutes.
    if let Some(stripped) = raw.strip_suffix("+00") {
        return parse_timestamp(stripped);
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Format a timestamp for reports (`YYYY-MM-DD HH:MM:SS`).
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(DISPLAY_FORMAT).to_string()
}

/// Serde adapter for `NaiveDateTime` fields that arrive in mixed formats.
pub mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.format(super::STORAGE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_timestamp(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }
}

/// An inclusive calendar-date window, `[start 00:00:00, end 23:59:59]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Parse `YYYY-MM-DD` query parameters.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, ServiceError> {
        let (Some(start), Some(end)) = (non_empty(start), non_empty(end)) else {
            return Err(ServiceError::Validation(
                "Start and end dates are required.".into(),
            ));
        };
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        if start > end {
            return Err(ServiceError::Validation(format!(
                "start date {start} is after end date {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// First instant of the window.
    pub fn lower_bound(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    /// Last instant of the window (end of the final second of `end`).
    pub fn upper_bound(&self) -> NaiveDateTime {
        self.end
            .and_hms_micro_opt(23, 59, 59, 999_999)
            .unwrap_or_else(|| self.end.and_time(NaiveTime::MIN))
    }

    pub fn contains(&self, ts: &NaiveDateTime) -> bool {
        *ts >= self.lower_bound() && *ts <= self.upper_bound()
    }
}

fn non_empty(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(raw: &str) -> Result<NaiveDate, ServiceError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ServiceError::Validation(format!("invalid date '{raw}', expected YYYY-MM-DD")))
}
