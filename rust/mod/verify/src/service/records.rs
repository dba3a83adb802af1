use chrono::NaiveDate;

use auth::Identity;
use pharmacheck_core::ServiceError;

use crate::model::{BatchForm, BatchRecord, LogEntry, QueryLog, SerialForm, SerialRecord};
use crate::service::VerifyService;

impl VerifyService {
    /// Register a batch from the add-records form.
    pub async fn add_batch(&self, form: BatchForm) -> Result<BatchRecord, ServiceError> {
        let batch_number = form.batch_number.trim();
        let manufacturer = form.manufacturer.trim();
        let expiry_date = form.expiry_date.trim();
        if batch_number.is_empty() || manufacturer.is_empty() || expiry_date.is_empty() {
            return Err(ServiceError::Validation(
                "batch_number, manufacturer and expiry_date are required".into(),
            ));
        }

        let record = BatchRecord {
            batch_number: batch_number.to_string(),
            manufacturer: manufacturer.to_string(),
            manufacture_date: optional(&form.manufacture_date).map(date).transpose()?,
            expiry_date: date(expiry_date)?,
            delivery_date: optional(&form.delivery_date).map(str::to_string),
            source_distributor: optional(&form.source_distributor).map(str::to_string),
        };
        self.store.insert_batch(&record).await?;
        tracing::info!(batch = %record.batch_number, expiry = %record.expiry_date, "batch added");
        Ok(record)
    }

    /// Register a serial. The batch reference is not checked; unknown
    /// batches verify as counterfeit.
    pub async fn add_serial(&self, form: SerialForm) -> Result<SerialRecord, ServiceError> {
        let serial_no = form.serial_no.trim();
        let batch_number = form.batch_number.trim();
        if serial_no.is_empty() || batch_number.is_empty() {
            return Err(ServiceError::Validation("serial_no and batch_number are required".into()));
        }

        let record = SerialRecord {
            serial_no: serial_no.to_string(),
            batch_number: batch_number.to_string(),
            strength_form: optional(&form.strength_form).map(str::to_string),
            units_per_pack: count("units_per_pack", &form.units_per_pack)?,
            packs_per_box: count("packs_per_box", &form.packs_per_box)?,
            pack_type: optional(&form.pack_type).map(str::to_string),
        };
        self.store.insert_serial(&record).await?;
        tracing::info!(serial = %record.serial_no, batch = %record.batch_number, "serial added");
        Ok(record)
    }

    /// Append a log entry on behalf of a client. `user_id` defaults to the
    /// caller, `timestamp` to now.
    pub async fn record_log(&self, entry: LogEntry, caller: &Identity) -> Result<(), ServiceError> {
        let serial = entry.serial.map(|s| s.trim().to_string()).unwrap_or_default();
        let status = entry.status.map(|s| s.trim().to_string()).unwrap_or_default();
        if serial.is_empty() || status.is_empty() {
            return Err(ServiceError::Validation("serial and status are required".into()));
        }
        let timestamp = match entry.timestamp.as_deref().map(str::trim) {
            None | Some("") => pharmacheck_core::now_utc(),
            Some(raw) => pharmacheck_core::parse_timestamp(raw)
                .ok_or_else(|| ServiceError::Validation(format!("invalid timestamp '{raw}'")))?,
        };
        let user_id = entry
            .user_id
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| caller.email.clone());

        self.store
            .append_log(&QueryLog {
                user_id: Some(user_id),
                serial,
                status,
                timestamp,
            })
            .await?;
        Ok(())
    }
}

fn optional(raw: &str) -> Option<&str> {
    Some(raw.trim()).filter(|s| !s.is_empty())
}

fn date(raw: &str) -> Result<NaiveDate, ServiceError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ServiceError::Validation(format!("invalid date '{raw}', expected YYYY-MM-DD")))
}

fn count(field: &str, raw: &str) -> Result<Option<i64>, ServiceError> {
    optional(raw)
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| ServiceError::Validation(format!("{field} must be a whole number")))
        })
        .transpose()
}
