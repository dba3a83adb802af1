use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use pharmacheck_rest::{Filter, RestClient, RestError};

use super::{BAD_CREDENTIALS, IdentityStore};
use crate::model::{Profile, Role};
use crate::service::AuthError;

/// GoTrue credentials plus a PostgREST profile table.
pub struct RestIdentityStore {
    client: Arc<RestClient>,
    profiles: String,
}

impl RestIdentityStore {
    pub fn new(client: Arc<RestClient>, profiles_table: &str) -> Self {
        Self {
            client,
            profiles: profiles_table.to_string(),
        }
    }
}

/// Column layout of the profile table.
#[derive(Debug, Serialize, Deserialize)]
struct ProfileRow {
    user_id: String,
    email: String,
    #[serde(default)]
    license: Option<String>,
    role: String,
}

impl From<&Profile> for ProfileRow {
    fn from(p: &Profile) -> Self {
        Self {
            user_id: p.user_id.clone(),
            email: p.email.clone(),
            license: p.license.clone(),
            role: p.role.as_str().to_string(),
        }
    }
}

impl TryFrom<ProfileRow> for Profile {
    type Error = AuthError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(Profile {
            role: row.role.parse::<Role>().map_err(AuthError::Storage)?,
            user_id: row.user_id,
            email: row.email,
            license: row.license,
        })
    }
}

impl From<RestError> for AuthError {
    fn from(e: RestError) -> Self {
        if e.is_conflict() {
            AuthError::Conflict(e.to_string())
        } else if e.is_transient() {
            AuthError::Unavailable(format!("record store unavailable: {e}"))
        } else {
            AuthError::Storage(e.to_string())
        }
    }
}

#[async_trait]
impl IdentityStore for RestIdentityStore {
    async fn create_account(&self, email: &str, password: &str) -> Result<String, AuthError> {
        match self.client.sign_up(email, password).await {
            Ok(user) => Ok(user.id),
            // GoTrue answers 422 "User already registered" for taken emails.
            Err(RestError::Status { status: 422, message }) if message.contains("registered") => {
                Err(AuthError::Conflict(format!("an account for {email} already exists")))
            }
            Err(RestError::Status { status: 400 | 422, message }) => {
                Err(AuthError::Validation(message))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn check_password(&self, email: &str, password: &str) -> Result<String, AuthError> {
        match self.client.sign_in_with_password(email, password).await {
            Ok(user) => Ok(user.id),
            Err(RestError::Status { status: 400 | 401, .. }) => {
                Err(AuthError::Unauthorized(BAD_CREDENTIALS.into()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn discard_account(&self, user_id: &str) -> Result<(), AuthError> {
        Ok(self.client.delete_user(user_id).await?)
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<(), AuthError> {
        let _: Vec<ProfileRow> = self
            .client
            .insert(&self.profiles, &ProfileRow::from(profile))
            .await?;
        Ok(())
    }

    async fn profile_by_email(&self, email: &str) -> Result<Option<Profile>, AuthError> {
        let rows: Vec<ProfileRow> = self
            .client
            .select(&self.profiles, "*", &[Filter::eq("email", email)])
            .await?;
        rows.into_iter().next().map(Profile::try_from).transpose()
    }
}
