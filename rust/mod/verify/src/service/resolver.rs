use chrono::NaiveDate;
use serde::Serialize;

use auth::Identity;
use pharmacheck_core::ServiceError;

use crate::model::{BatchRecord, QueryLog, SerialRecord, VerificationStatus};
use crate::service::VerifyService;

/// What a code resolved to. Batch numbers take precedence over serials.
#[derive(Debug, Clone, PartialEq)]
pub enum Match {
    Batch(BatchRecord),
    /// `batch` is `None` when the serial's batch reference dangles.
    Serial {
        serial: SerialRecord,
        batch: Option<BatchRecord>,
    },
    None,
}

/// Response of `POST /api/verify`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Verification {
    pub status: VerificationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    pub user: String,
}

impl Match {
    /// Classify against `today`. Counterfeit results carry no metadata.
    pub fn classify(&self, today: NaiveDate, user: &str) -> Verification {
        let counterfeit = Verification {
            status: VerificationStatus::Counterfeit,
            expiry_date: None,
            batch: None,
            manufacturer: None,
            serial: None,
            user: user.to_string(),
        };
        let (batch, serial) = match self {
            Match::Batch(b) => (b, None),
            Match::Serial { serial, batch: Some(b) } => (b, Some(serial.serial_no.clone())),
            Match::Serial { batch: None, .. } | Match::None => return counterfeit,
        };
        Verification {
            status: if batch.is_expired(today) {
                VerificationStatus::Expired
            } else {
                VerificationStatus::Authentic
            },
            expiry_date: Some(batch.expiry_date),
            batch: Some(batch.batch_number.clone()),
            manufacturer: Some(batch.manufacturer.clone()),
            serial,
            user: user.to_string(),
        }
    }
}

impl VerifyService {
    /// Resolve a code against the batch table, then the serial table.
    pub async fn lookup(&self, code: &str) -> Result<Match, ServiceError> {
        let batch = self.store.batch_by_number(code).await?;
        let serial = self.store.serial_by_number(code).await?;

        match (batch, serial) {
            (Some(batch), serial) => {
                if serial.is_some() {
                    tracing::warn!(code, "code matches both a batch and a serial; using the batch");
                }
                Ok(Match::Batch(batch))
            }
            (None, Some(serial)) => {
                let batch = self.store.batch_by_number(&serial.batch_number).await?;
                if batch.is_none() {
                    tracing::warn!(
                        serial = %serial.serial_no,
                        batch = %serial.batch_number,
                        "serial references a missing batch"
                    );
                }
                Ok(Match::Serial { serial, batch })
            }
            (None, None) => Ok(Match::None),
        }
    }

    /// Verify a code for the caller and, when enabled, log the query.
    pub async fn verify(&self, code: &str, caller: &Identity) -> Result<Verification, ServiceError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ServiceError::Validation("A serial or batch number is required.".into()));
        }

        let result = self.lookup(code).await?.classify(self.today(), &caller.email);
        tracing::info!(code, status = %result.status, user = %caller.email, "verification");

        if self.config.record_queries {
            let entry = QueryLog {
                user_id: Some(caller.email.clone()),
                serial: code.to_string(),
                status: result.status.as_str().to_string(),
                timestamp: pharmacheck_core::now_utc(),
            };
            if let Err(e) = self.store.append_log(&entry).await {
                tracing::warn!(code, "query log not recorded: {e}");
            }
        }

        Ok(result)
    }
}
