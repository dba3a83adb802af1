//! Identity backends.
//!
//! An [`IdentityStore`] owns credentials and the profile table. The REST
//! backend delegates credentials to GoTrue; the SQL backend keeps argon2
//! hashes next to the profiles.

mod rest;
mod sql;

pub use rest::RestIdentityStore;
pub use sql::SqlIdentityStore;

use async_trait::async_trait;

use crate::model::Profile;
use crate::service::AuthError;

#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Create credentials for a new account and return its user id.
    /// A taken email is `AuthError::Conflict`.
    async fn create_account(&self, email: &str, password: &str) -> Result<String, AuthError>;

    /// Check credentials and return the user id.
    /// Bad credentials are `AuthError::Unauthorized`.
    async fn check_password(&self, email: &str, password: &str) -> Result<String, AuthError>;

    /// Remove credentials created by `create_account`. Used to undo a
    /// signup whose profile could not be stored.
    async fn discard_account(&self, user_id: &str) -> Result<(), AuthError>;

    async fn insert_profile(&self, profile: &Profile) -> Result<(), AuthError>;

    async fn profile_by_email(&self, email: &str) -> Result<Option<Profile>, AuthError>;
}

pub(crate) const BAD_CREDENTIALS: &str = "Invalid email or password.";
