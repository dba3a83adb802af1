pub mod error;
pub mod module;
pub mod types;

pub use error::ServiceError;
pub use module::Module;
pub use types::{DateRange, format_timestamp, new_id, now_utc, parse_timestamp};
