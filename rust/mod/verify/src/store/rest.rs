use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;
use serde::de::DeserializeOwned;

use pharmacheck_rest::{Filter, RestClient, RestError};

use super::{RecordStore, StoreError, Tables, bound};
use crate::model::{BatchRecord, IncidentReport, QueryLog, SerialRecord};

/// Record tables behind a PostgREST endpoint.
pub struct RestRecordStore {
    client: Arc<RestClient>,
    tables: Tables,
}

impl RestRecordStore {
    pub fn new(client: Arc<RestClient>, tables: Tables) -> Self {
        Self { client, tables }
    }

    async fn first<T: DeserializeOwned>(&self, table: &str, column: &str, value: &str) -> Result<Option<T>, StoreError> {
        let rows: Vec<T> = self
            .client
            .select(table, "*", &[Filter::eq(column, value)])
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_one<B: Serialize + Sync>(&self, table: &str, record: &B) -> Result<Vec<serde_json::Value>, StoreError> {
        Ok(self.client.insert(table, record).await?)
    }
}

impl From<RestError> for StoreError {
    fn from(e: RestError) -> Self {
        match e {
            e if e.is_conflict() => StoreError::Conflict(e.to_string()),
            e if e.is_transient() => StoreError::Unavailable(e.to_string()),
            RestError::Decode(m) => StoreError::Decode(m),
            e => StoreError::Backend(e.to_string()),
        }
    }
}

#[async_trait]
impl RecordStore for RestRecordStore {
    async fn batch_by_number(&self, batch_number: &str) -> Result<Option<BatchRecord>, StoreError> {
        self.first(&self.tables.batches, "batch_number", batch_number).await
    }

    async fn serial_by_number(&self, serial_no: &str) -> Result<Option<SerialRecord>, StoreError> {
        self.first(&self.tables.serials, "serial_no", serial_no).await
    }

    async fn insert_batch(&self, batch: &BatchRecord) -> Result<(), StoreError> {
        self.insert_one(&self.tables.batches, batch).await.map(|_| ())
    }

    async fn insert_serial(&self, serial: &SerialRecord) -> Result<(), StoreError> {
        self.insert_one(&self.tables.serials, serial).await.map(|_| ())
    }

    async fn append_log(&self, log: &QueryLog) -> Result<(), StoreError> {
        self.insert_one(&self.tables.query_logs, log).await.map(|_| ())
    }

    async fn logs_between(&self, from: NaiveDateTime, to: NaiveDateTime) -> Result<Vec<QueryLog>, StoreError> {
        Ok(self
            .client
            .select(
                &self.tables.query_logs,
                "serial,status,timestamp",
                &[
                    Filter::gte("timestamp", bound(&from)),
                    Filter::lte("timestamp", bound(&to)),
                ],
            )
            .await?)
    }

    async fn insert_incident(&self, report: &IncidentReport) -> Result<IncidentReport, StoreError> {
        let rows = self.insert_one(&self.tables.incidents, report).await?;
        // Prefer the stored row (server defaults applied); fall back to the input.
        Ok(rows
            .into_iter()
            .next()
            .and_then(|row| serde_json::from_value(row).ok())
            .unwrap_or_else(|| report.clone()))
    }

    async fn incidents_between(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<IncidentReport>, StoreError> {
        Ok(self
            .client
            .select(
                &self.tables.incidents,
                "product_name,batch_serial,location,description,name,email,created_at",
                &[
                    Filter::gte("created_at", bound(&from)),
                    Filter::lte("created_at", bound(&to)),
                ],
            )
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use pharmacheck_core::ServiceError;
    use pharmacheck_rest::testing::MockServer;

    #[test]
    fn rest_errors_map_to_store_errors() {
        let e = StoreError::from(RestError::Status { status: 409, message: "duplicate key".into() });
        assert!(matches!(e, StoreError::Conflict(_)));
        let e = StoreError::from(RestError::Status { status: 502, message: "bad gateway".into() });
        assert!(matches!(e, StoreError::Unavailable(_)));
        let e = StoreError::from(RestError::Status { status: 404, message: "no such table".into() });
        assert!(matches!(e, StoreError::Backend(_)));
        let e = StoreError::from(RestError::Decode("expected array".into()));
        assert!(matches!(e, StoreError::Decode(_)));
    }

    fn store(server: &MockServer, max_retries: u32) -> RestRecordStore {
        RestRecordStore::new(Arc::new(server.client(max_retries)), Tables::default())
    }

    #[tokio::test]
    async fn batch_lookup_selects_by_batch_number() {
        let server = MockServer::reply(
            200,
            serde_json::json!([{
                "batch_number": "BTX-45",
                "manufacturer": "PharmaCo Kenya",
                "expiry_date": "2026-10-01"
            }]),
        )
        .await;
        let batch = store(&server, 0).batch_by_number("BTX-45").await.unwrap().unwrap();
        assert_eq!(batch.manufacturer, "PharmaCo Kenya");

        let hits = server.hits();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].path, "/rest/v1/AMOXICILLIN_BATCH");
        assert_eq!(hits[0].query, "select=*&batch_number=eq.BTX-45");
    }

    #[tokio::test]
    async fn empty_result_is_none() {
        let server = MockServer::reply(200, serde_json::json!([])).await;
        assert!(store(&server, 0).serial_by_number("S-404").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unavailable_backend_is_retried_then_503() {
        let server = MockServer::reply(503, serde_json::json!({"message": "upstream down"})).await;
        let err = store(&server, 2).serial_by_number("S1").await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert_eq!(server.hits().len(), 3);
        assert_eq!(ServiceError::from(err).status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn failed_append_is_not_retried() {
        let server = MockServer::reply(503, serde_json::json!({"message": "upstream down"})).await;
        let log = QueryLog {
            serial: "S1".into(),
            status: "authentic".into(),
            timestamp: chrono::Utc::now().naive_utc(),
            user_id: None,
        };
        let err = store(&server, 2).append_log(&log).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));

        let hits = server.hits();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].path, "/rest/v1/pharmlogs");
    }

    #[test]
    fn stored_rows_decode_from_postgrest_json() {
        let batch: BatchRecord = serde_json::from_value(serde_json::json!({
            "id": 7,
            "batch_number": "BTX-45",
            "manufacturer": "PharmaCo Kenya",
            "manufacture_date": null,
            "expiry_date": "2026-10-01",
            "delivery_date": "2024-02-01T09:30",
            "source_distributor": null
        }))
        .unwrap();
        assert_eq!(batch.expiry_date.to_string(), "2026-10-01");

        let log: QueryLog = serde_json::from_value(serde_json::json!({
            "serial": "S1",
            "status": "authentic",
            "timestamp": "2025-04-01T10:15:00.123+00:00"
        }))
        .unwrap();
        assert_eq!(log.user_id, None);
        assert_eq!(log.timestamp.to_string(), "2025-04-01 10:15:00.123");
    }
}
