//! HTTP gateway to a PostgREST / GoTrue backend (the Supabase API shape).
//!
//! Table access goes through `/rest/v1/{table}`, identity through
//! `/auth/v1/*`. Every call carries the project API key. Reads are retried
//! under a bounded [`RetryPolicy`]; writes are attempted once.

pub mod client;
pub mod error;
pub mod gotrue;
pub mod retry;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use client::{Filter, RestClient, RestConfig};
pub use error::RestError;
pub use gotrue::AuthUser;
pub use retry::RetryPolicy;
