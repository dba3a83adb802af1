use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A manufactured lot. Keyed by `batch_number`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRecord {
    pub batch_number: String,
    pub manufacturer: String,
    #[serde(default)]
    pub manufacture_date: Option<NaiveDate>,
    pub expiry_date: NaiveDate,
    /// Free-form value of a datetime-local input (`YYYY-MM-DDTHH:MM`).
    #[serde(default)]
    pub delivery_date: Option<String>,
    #[serde(default)]
    pub source_distributor: Option<String>,
}

impl BatchRecord {
    /// Expired strictly after the expiry day; the expiry day itself is valid.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        today > self.expiry_date
    }
}

/// One numbered package. `batch_number` may dangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerialRecord {
    pub serial_no: String,
    pub batch_number: String,
    #[serde(default)]
    pub strength_form: Option<String>,
    #[serde(default)]
    pub units_per_pack: Option<i64>,
    #[serde(default)]
    pub packs_per_box: Option<i64>,
    #[serde(default)]
    pub pack_type: Option<String>,
}

/// Add-batch form as posted by the records page. Every field arrives as
/// text; blank means absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BatchForm {
    pub batch_number: String,
    pub manufacturer: String,
    pub manufacture_date: String,
    pub expiry_date: String,
    pub delivery_date: String,
    pub source_distributor: String,
}

/// Add-serial form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SerialForm {
    pub serial_no: String,
    pub batch_number: String,
    pub strength_form: String,
    pub units_per_pack: String,
    pub packs_per_box: String,
    pub pack_type: String,
}
