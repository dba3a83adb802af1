use std::sync::Arc;

use argon2::Argon2;
use async_trait::async_trait;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use pharmacheck_sql::{Row, SQLError, SQLStore, Value};

use super::{BAD_CREDENTIALS, IdentityStore};
use crate::model::{Profile, Role};
use crate::service::AuthError;

/// Accounts and profiles in the embedded SQL store.
pub struct SqlIdentityStore {
    sql: Arc<dyn SQLStore>,
    profiles: String,
}

impl SqlIdentityStore {
    /// Open the store and create its tables if they don't exist.
    pub fn new(sql: Arc<dyn SQLStore>, profiles_table: &str) -> Result<Self, AuthError> {
        let store = Self {
            sql,
            profiles: profiles_table.to_string(),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), AuthError> {
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS \"{0}\" (
                user_id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                license TEXT,
                role TEXT NOT NULL
            );",
            self.profiles
        );
        self.sql.exec_batch(&ddl).map_err(storage)
    }

    fn row_to_profile(row: &Row) -> Result<Profile, AuthError> {
        let role = row
            .get_str("role")
            .unwrap_or_default()
            .parse::<Role>()
            .map_err(AuthError::Storage)?;
        Ok(Profile {
            user_id: row.get_string("user_id").unwrap_or_default(),
            email: row.get_string("email").unwrap_or_default(),
            license: row.get_string("license"),
            role,
        })
    }
}

#[async_trait]
impl IdentityStore for SqlIdentityStore {
    async fn create_account(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Internal(format!("password hash failed: {e}")))?
            .to_string();

        let id = pharmacheck_core::new_id();
        let created_at = pharmacheck_core::format_timestamp(&pharmacheck_core::now_utc());
        self.sql
            .exec(
                "INSERT INTO accounts (id, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
                &[id.as_str().into(), email.into(), hash.into(), created_at.into()],
            )
            .map_err(|e| match e {
                SQLError::UniqueViolation(_) => {
                    AuthError::Conflict(format!("an account for {email} already exists"))
                }
                other => storage(other),
            })?;
        Ok(id)
    }

    async fn check_password(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let rows = self
            .sql
            .query(
                "SELECT id, password_hash FROM accounts WHERE email = ?1",
                &[email.into()],
            )
            .map_err(storage)?;
        let row = rows
            .first()
            .ok_or_else(|| AuthError::Unauthorized(BAD_CREDENTIALS.into()))?;

        let stored = row.get_str("password_hash").unwrap_or_default();
        let parsed = PasswordHash::new(stored)
            .map_err(|e| AuthError::Internal(format!("corrupt password hash: {e}")))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| AuthError::Unauthorized(BAD_CREDENTIALS.into()))?;

        row.get_string("id")
            .ok_or_else(|| AuthError::Storage("account row without id".into()))
    }

    async fn discard_account(&self, user_id: &str) -> Result<(), AuthError> {
        self.sql
            .exec("DELETE FROM accounts WHERE id = ?1", &[user_id.into()])
            .map_err(storage)?;
        Ok(())
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<(), AuthError> {
        let sql = format!(
            "INSERT INTO \"{}\" (user_id, email, license, role) VALUES (?1, ?2, ?3, ?4)",
            self.profiles
        );
        self.sql
            .exec(
                &sql,
                &[
                    profile.user_id.as_str().into(),
                    profile.email.as_str().into(),
                    Value::from(profile.license.clone()),
                    profile.role.as_str().into(),
                ],
            )
            .map_err(|e| match e {
                SQLError::UniqueViolation(_) => {
                    AuthError::Conflict(format!("a profile for {} already exists", profile.email))
                }
                other => storage(other),
            })?;
        Ok(())
    }

    async fn profile_by_email(&self, email: &str) -> Result<Option<Profile>, AuthError> {
        let sql = format!(
            "SELECT user_id, email, license, role FROM \"{}\" WHERE email = ?1",
            self.profiles
        );
        let rows = self.sql.query(&sql, &[email.into()]).map_err(storage)?;
        rows.first().map(Self::row_to_profile).transpose()
    }
}

fn storage(e: SQLError) -> AuthError {
    AuthError::Storage(e.to_string())
}
