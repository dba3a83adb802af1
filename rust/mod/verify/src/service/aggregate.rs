use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use pharmacheck_core::{DateRange, ServiceError, format_timestamp};

use crate::model::{QueryLog, ReportRow, ReportSummary, VerificationStatus};
use crate::service::VerifyService;

#[derive(Default)]
struct Tally {
    total: u64,
    authentic: u64,
    counterfeit: u64,
    expired: u64,
    other: u64,
    last: Option<NaiveDateTime>,
}

/// Roll query logs up per serial.
///
/// Rows come back sorted by serial and the result does not depend on
/// input order. The summary counts only the three canonical statuses;
/// anything else lands in the row's `other_count`.
pub fn aggregate(logs: &[QueryLog]) -> (Vec<ReportRow>, ReportSummary) {
    let mut by_serial: BTreeMap<&str, Tally> = BTreeMap::new();
    let mut summary = ReportSummary::default();

    for log in logs {
        let t = by_serial.entry(log.serial.as_str()).or_default();
        t.total += 1;
        summary.total_queries += 1;

        match VerificationStatus::from_logged(&log.status) {
            Some(VerificationStatus::Authentic) => {
                t.authentic += 1;
                summary.authentic_count += 1;
            }
            Some(VerificationStatus::Counterfeit) => {
                t.counterfeit += 1;
                summary.counterfeit_count += 1;
            }
            Some(VerificationStatus::Expired) => {
                t.expired += 1;
                summary.expired_count += 1;
            }
            None => t.other += 1,
        }

        if t.last.is_none_or(|last| log.timestamp > last) {
            t.last = Some(log.timestamp);
        }
    }

    let rows = by_serial
        .into_iter()
        .map(|(serial, t)| ReportRow {
            serial: serial.to_string(),
            total_queries: t.total,
            authentic_count: t.authentic,
            counterfeit_count: t.counterfeit,
            expired_count: t.expired,
            other_count: t.other,
            last_query_timestamp: t.last.as_ref().map(format_timestamp),
        })
        .collect();

    (rows, summary)
}

impl VerifyService {
    /// Aggregated query report for the logs inside `range`.
    pub async fn query_report(&self, range: &DateRange) -> Result<(Vec<ReportRow>, ReportSummary), ServiceError> {
        let mut logs = self
            .store
            .logs_between(range.lower_bound(), range.upper_bound())
            .await?;
        // PostgREST compares the naive bounds in the database time zone.
        logs.retain(|log| range.contains(&log.timestamp));
        tracing::debug!(start = %range.start, end = %range.end, rows = logs.len(), "aggregating query logs");
        Ok(aggregate(&logs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(serial: &str, status: &str, at: &str) -> QueryLog {
        QueryLog {
            user_id: None,
            serial: serial.into(),
            status: status.into(),
            timestamp: pharmacheck_core::parse_timestamp(at).unwrap(),
        }
    }

    fn sample() -> Vec<QueryLog> {
        vec![
            log("S1", "AUTHENTIC", "2025-04-01 09:00:00"),
            log("S1", "EXPIRED", "2025-04-02 17:30:00"),
            log("S2", "COUNTERFEIT", "2025-04-01 12:00:00"),
        ]
    }

    #[test]
    fn worked_example() {
        let (rows, summary) = aggregate(&sample());
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].serial, "S1");
        assert_eq!(rows[0].total_queries, 2);
        assert_eq!(rows[0].authentic_count, 1);
        assert_eq!(rows[0].expired_count, 1);
        assert_eq!(rows[0].counterfeit_count, 0);
        assert_eq!(rows[0].last_query_timestamp.as_deref(), Some("2025-04-02 17:30:00"));

        assert_eq!(rows[1].serial, "S2");
        assert_eq!(rows[1].total_queries, 1);
        assert_eq!(rows[1].counterfeit_count, 1);

        assert_eq!(
            summary,
            ReportSummary {
                total_queries: 3,
                authentic_count: 1,
                counterfeit_count: 1,
                expired_count: 1,
            }
        );
    }

    #[test]
    fn permutations_give_identical_output() {
        let mut logs = sample();
        logs.push(log("S3", "authentic", "2025-04-03 08:00:00"));
        logs.push(log("S1", "Authentic", "2025-04-02 17:30:00"));
        logs.push(log("S2", "not found", "2025-04-03 10:00:00"));
        let expected = aggregate(&logs);

        // Every rotation plus the reversal of each.
        for shift in 0..logs.len() {
            let mut rotated = logs.clone();
            rotated.rotate_left(shift);
            assert_eq!(aggregate(&rotated), expected);
            rotated.reverse();
            assert_eq!(aggregate(&rotated), expected);
        }
    }

    #[test]
    fn summary_equals_row_sums() {
        let mut logs = sample();
        logs.push(log("S4", "weird", "2025-04-05 00:00:00"));
        logs.push(log("S4", "counterfeit", "2025-04-05 00:00:01"));
        let (rows, summary) = aggregate(&logs);

        let sum = |f: fn(&ReportRow) -> u64| rows.iter().map(f).sum::<u64>();
        assert_eq!(summary.total_queries, sum(|r| r.total_queries));
        assert_eq!(summary.authentic_count, sum(|r| r.authentic_count));
        assert_eq!(summary.counterfeit_count, sum(|r| r.counterfeit_count));
        assert_eq!(summary.expired_count, sum(|r| r.expired_count));
    }

    #[test]
    fn unknown_status_counts_as_other_only() {
        let (rows, summary) = aggregate(&[log("S9", "not found", "2025-04-01 00:00:00")]);
        assert_eq!(rows[0].other_count, 1);
        assert_eq!(rows[0].total_queries, 1);
        assert_eq!(summary.total_queries, 1);
        assert_eq!(summary.authentic_count + summary.counterfeit_count + summary.expired_count, 0);
    }

    #[test]
    fn no_logs_no_rows() {
        let (rows, summary) = aggregate(&[]);
        assert!(rows.is_empty());
        assert_eq!(summary, ReportSummary::default());
    }

    #[tokio::test]
    async fn rows_outside_the_window_are_dropped() {
        use std::sync::Arc;

        use pharmacheck_rest::testing::MockServer;

        use crate::store::{RestRecordStore, Tables};

        let server = MockServer::reply(
            200,
            serde_json::json!([
                {"serial": "S1", "status": "AUTHENTIC", "timestamp": "2025-03-31T23:30:00+00:00"},
                {"serial": "S1", "status": "EXPIRED", "timestamp": "2025-04-01T08:00:00+00:00"},
                {"serial": "S2", "status": "COUNTERFEIT", "timestamp": "2025-04-30T23:59:59+00:00"},
                {"serial": "S3", "status": "AUTHENTIC", "timestamp": "2025-05-01T00:30:00+00:00"}
            ]),
        )
        .await;
        let store = RestRecordStore::new(Arc::new(server.client(0)), Tables::default());
        let svc = VerifyService::new(Arc::new(store), Default::default());

        let range = DateRange::parse(Some("2025-04-01"), Some("2025-04-30")).unwrap();
        let (rows, summary) = svc.query_report(&range).await.unwrap();
        assert_eq!(summary.total_queries, 2);
        assert_eq!(rows.iter().map(|r| r.serial.as_str()).collect::<Vec<_>>(), ["S1", "S2"]);
        assert_eq!(rows[0].expired_count, 1);
        assert_eq!(rows[0].authentic_count, 0);
    }

    #[tokio::test]
    async fn record_log_defaults_and_validation() {
        use auth::{Identity, Role};

        use crate::model::LogEntry;
        use crate::service::testing::service;

        let svc = service(false);
        let caller = Identity {
            user_id: "u-1".into(),
            email: "ph@pharmacheck.test".into(),
            role: Role::Pharmacist,
        };

        svc.record_log(
            LogEntry {
                serial: Some("S1".into()),
                status: Some("AUTHENTIC".into()),
                timestamp: Some("2025-04-01T10:00:00.000Z".into()),
                ..Default::default()
            },
            &caller,
        )
        .await
        .unwrap();

        let missing = svc
            .record_log(LogEntry { serial: Some("S1".into()), ..Default::default() }, &caller)
            .await;
        assert!(matches!(missing, Err(ServiceError::Validation(_))));

        let bad_ts = svc
            .record_log(
                LogEntry {
                    serial: Some("S1".into()),
                    status: Some("AUTHENTIC".into()),
                    timestamp: Some("yesterday".into()),
                    ..Default::default()
                },
                &caller,
            )
            .await;
        assert!(matches!(bad_ts, Err(ServiceError::Validation(_))));

        let range = DateRange::parse(Some("2025-04-01"), Some("2025-04-01")).unwrap();
        let (rows, _) = svc.query_report(&range).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].last_query_timestamp.as_deref(), Some("2025-04-01 10:00:00"));
    }
}
