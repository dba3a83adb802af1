pub mod account;
pub mod session;

use std::sync::Arc;

use jsonwebtoken::{DecodingKey, EncodingKey};
use thiserror::Error;

use pharmacheck_core::ServiceError;

use crate::store::IdentityStore;

/// Auth service error type.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Storage(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Internal(String),
}

impl From<AuthError> for ServiceError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(m) => ServiceError::Validation(m),
            AuthError::Conflict(m) => ServiceError::Conflict(m),
            AuthError::Unauthorized(m) => ServiceError::Unauthorized(m),
            AuthError::Forbidden(m) => ServiceError::PermissionDenied(m),
            AuthError::Storage(m) => ServiceError::Storage(m),
            AuthError::Unavailable(m) => ServiceError::Unavailable(m),
            AuthError::Internal(m) => ServiceError::Internal(m),
        }
    }
}

/// Configuration for the auth service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// JWT signing secret (HS256).
    pub jwt_secret: String,
    /// Session token lifetime in seconds (default: 24h).
    pub session_ttl: i64,
    /// Whether the public signup form may create Admin accounts.
    pub allow_admin_signup: bool,
    /// Mark the session cookie `Secure` (HTTPS deployments).
    pub secure_cookie: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "pharmacheck-dev-secret-change-me".to_string(),
            session_ttl: 86400,
            allow_admin_signup: false,
            secure_cookie: false,
        }
    }
}

/// The Auth service: account lifecycle over an [`IdentityStore`] plus
/// stateless JWT sessions.
pub struct AuthService {
    pub(crate) identities: Arc<dyn IdentityStore>,
    pub(crate) config: AuthConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    pub fn new(identities: Arc<dyn IdentityStore>, config: AuthConfig) -> Arc<Self> {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        Arc::new(Self {
            identities,
            config,
            encoding_key,
            decoding_key,
        })
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }
}
