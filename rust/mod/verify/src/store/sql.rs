use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use pharmacheck_sql::{Row, SQLError, SQLStore, Value};

use super::{RecordStore, StoreError, Tables, bound};
use crate::model::{BatchRecord, IncidentReport, QueryLog, SerialRecord};

/// Record tables in the embedded SQL store.
pub struct SqlRecordStore {
    sql: Arc<dyn SQLStore>,
    tables: Tables,
}

impl SqlRecordStore {
    /// Open the store and create missing tables.
    pub fn new(sql: Arc<dyn SQLStore>, tables: Tables) -> Result<Self, StoreError> {
        let store = Self { sql, tables };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        let t = &self.tables;
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS \"{batches}\" (
                batch_number TEXT PRIMARY KEY,
                manufacturer TEXT NOT NULL,
                manufacture_date TEXT,
                expiry_date TEXT NOT NULL,
                delivery_date TEXT,
                source_distributor TEXT
            );
            CREATE TABLE IF NOT EXISTS \"{serials}\" (
                serial_no TEXT PRIMARY KEY,
                batch_number TEXT NOT NULL,
                strength_form TEXT,
                units_per_pack INTEGER,
                packs_per_box INTEGER,
                pack_type TEXT
            );
            CREATE INDEX IF NOT EXISTS \"idx_{serials}_batch\" ON \"{serials}\"(batch_number);
            CREATE TABLE IF NOT EXISTS \"{logs}\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT,
                serial TEXT NOT NULL,
                status TEXT NOT NULL,
                timestamp TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS \"idx_{logs}_timestamp\" ON \"{logs}\"(timestamp);
            CREATE TABLE IF NOT EXISTS \"{incidents}\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                product_name TEXT NOT NULL,
                batch_serial TEXT NOT NULL,
                location TEXT NOT NULL,
                description TEXT NOT NULL,
                name TEXT,
                email TEXT,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS \"idx_{incidents}_created\" ON \"{incidents}\"(created_at);",
            batches = t.batches,
            serials = t.serials,
            logs = t.query_logs,
            incidents = t.incidents,
        );
        self.sql.exec_batch(&ddl).map_err(from_sql)
    }

    fn row_to_batch(row: &Row) -> Result<BatchRecord, StoreError> {
        Ok(BatchRecord {
            batch_number: required(row, "batch_number")?,
            manufacturer: required(row, "manufacturer")?,
            manufacture_date: row.get_str("manufacture_date").map(parse_date).transpose()?,
            expiry_date: parse_date(&required(row, "expiry_date")?)?,
            delivery_date: row.get_string("delivery_date"),
            source_distributor: row.get_string("source_distributor"),
        })
    }

    fn row_to_serial(row: &Row) -> Result<SerialRecord, StoreError> {
        Ok(SerialRecord {
            serial_no: required(row, "serial_no")?,
            batch_number: required(row, "batch_number")?,
            strength_form: row.get_string("strength_form"),
            units_per_pack: row.get_i64("units_per_pack"),
            packs_per_box: row.get_i64("packs_per_box"),
            pack_type: row.get_string("pack_type"),
        })
    }

    fn row_to_log(row: &Row) -> Result<QueryLog, StoreError> {
        Ok(QueryLog {
            user_id: row.get_string("user_id"),
            serial: required(row, "serial")?,
            status: required(row, "status")?,
            timestamp: parse_ts(&required(row, "timestamp")?)?,
        })
    }

    fn row_to_incident(row: &Row) -> Result<IncidentReport, StoreError> {
        Ok(IncidentReport {
            product_name: required(row, "product_name")?,
            batch_serial: required(row, "batch_serial")?,
            location: required(row, "location")?,
            description: required(row, "description")?,
            reporter_name: row.get_string("name"),
            reporter_email: row.get_string("email"),
            created_at: parse_ts(&required(row, "created_at")?)?,
        })
    }

    fn insert(&self, table: &str, columns: &[&str], params: &[Value], what: &str) -> Result<(), StoreError> {
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO \"{table}\" ({}) VALUES ({})",
            columns.join(", "),
            placeholders.join(", ")
        );
        self.sql.exec(&sql, params).map_err(|e| match e {
            SQLError::UniqueViolation(_) => StoreError::Conflict(format!("{what} already exists")),
            other => from_sql(other),
        })?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqlRecordStore {
    async fn batch_by_number(&self, batch_number: &str) -> Result<Option<BatchRecord>, StoreError> {
        let sql = format!(
            "SELECT * FROM \"{}\" WHERE batch_number = ?1 LIMIT 1",
            self.tables.batches
        );
        let rows = self.sql.query(&sql, &[batch_number.into()]).map_err(from_sql)?;
        rows.first().map(Self::row_to_batch).transpose()
    }

    async fn serial_by_number(&self, serial_no: &str) -> Result<Option<SerialRecord>, StoreError> {
        let sql = format!(
            "SELECT * FROM \"{}\" WHERE serial_no = ?1 LIMIT 1",
            self.tables.serials
        );
        let rows = self.sql.query(&sql, &[serial_no.into()]).map_err(from_sql)?;
        rows.first().map(Self::row_to_serial).transpose()
    }

    async fn insert_batch(&self, b: &BatchRecord) -> Result<(), StoreError> {
        self.insert(
            &self.tables.batches,
            &[
                "batch_number",
                "manufacturer",
                "manufacture_date",
                "expiry_date",
                "delivery_date",
                "source_distributor",
            ],
            &[
                b.batch_number.as_str().into(),
                b.manufacturer.as_str().into(),
                b.manufacture_date.map(|d| d.to_string()).into(),
                b.expiry_date.to_string().into(),
                b.delivery_date.clone().into(),
                b.source_distributor.clone().into(),
            ],
            &format!("batch {}", b.batch_number),
        )
    }

    async fn insert_serial(&self, s: &SerialRecord) -> Result<(), StoreError> {
        self.insert(
            &self.tables.serials,
            &[
                "serial_no",
                "batch_number",
                "strength_form",
                "units_per_pack",
                "packs_per_box",
                "pack_type",
            ],
            &[
                s.serial_no.as_str().into(),
                s.batch_number.as_str().into(),
                s.strength_form.clone().into(),
                s.units_per_pack.into(),
                s.packs_per_box.into(),
                s.pack_type.clone().into(),
            ],
            &format!("serial {}", s.serial_no),
        )
    }

    async fn append_log(&self, log: &QueryLog) -> Result<(), StoreError> {
        self.insert(
            &self.tables.query_logs,
            &["user_id", "serial", "status", "timestamp"],
            &[
                log.user_id.clone().into(),
                log.serial.as_str().into(),
                log.status.as_str().into(),
                bound(&log.timestamp).into(),
            ],
            "log entry",
        )
    }

    async fn logs_between(&self, from: NaiveDateTime, to: NaiveDateTime) -> Result<Vec<QueryLog>, StoreError> {
        let sql = format!(
            "SELECT user_id, serial, status, timestamp FROM \"{}\"
             WHERE timestamp >= ?1 AND timestamp <= ?2",
            self.tables.query_logs
        );
        let rows = self
            .sql
            .query(&sql, &[bound(&from).into(), bound(&to).into()])
            .map_err(from_sql)?;
        rows.iter().map(Self::row_to_log).collect()
    }

    async fn insert_incident(&self, r: &IncidentReport) -> Result<IncidentReport, StoreError> {
        self.insert(
            &self.tables.incidents,
            &[
                "product_name",
                "batch_serial",
                "location",
                "description",
                "name",
                "email",
                "created_at",
            ],
            &[
                r.product_name.as_str().into(),
                r.batch_serial.as_str().into(),
                r.location.as_str().into(),
                r.description.as_str().into(),
                r.reporter_name.clone().into(),
                r.reporter_email.clone().into(),
                bound(&r.created_at).into(),
            ],
            "incident report",
        )?;
        Ok(r.clone())
    }

    async fn incidents_between(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<IncidentReport>, StoreError> {
        let sql = format!(
            "SELECT * FROM \"{}\" WHERE created_at >= ?1 AND created_at <= ?2 ORDER BY created_at",
            self.tables.incidents
        );
        let rows = self
            .sql
            .query(&sql, &[bound(&from).into(), bound(&to).into()])
            .map_err(from_sql)?;
        rows.iter().map(Self::row_to_incident).collect()
    }
}

fn from_sql(e: SQLError) -> StoreError {
    match e {
        SQLError::UniqueViolation(m) => StoreError::Conflict(m),
        SQLError::Connection(m) => StoreError::Unavailable(m),
        other => StoreError::Backend(other.to_string()),
    }
}

fn required(row: &Row, column: &str) -> Result<String, StoreError> {
    row.get_string(column)
        .ok_or_else(|| StoreError::Decode(format!("column {column} is missing")))
}

fn parse_date(raw: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| StoreError::Decode(format!("bad date '{raw}': {e}")))
}

fn parse_ts(raw: &str) -> Result<NaiveDateTime, StoreError> {
    pharmacheck_core::parse_timestamp(raw)
        .ok_or_else(|| StoreError::Decode(format!("bad timestamp '{raw}'")))
}
