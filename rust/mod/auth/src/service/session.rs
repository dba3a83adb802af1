use jsonwebtoken::{Header, Validation, decode, encode};

use crate::model::{Claims, Identity, Profile, TokenGrant};
use crate::service::{AuthError, AuthService};

impl AuthService {
    /// Sign a session token for a profile.
    pub fn issue_token(&self, profile: &Profile) -> Result<TokenGrant, AuthError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: profile.user_id.clone(),
            email: profile.email.clone(),
            role: profile.role,
            iat: now,
            exp: now + self.config.session_ttl,
        };

        let access_token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("JWT encode failed: {e}")))?;

        Ok(TokenGrant {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.session_ttl,
            role: profile.role,
        })
    }

    /// Verify a session token and return the caller's identity.
    pub fn verify_token(&self, token: &str) -> Result<Identity, AuthError> {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AuthError::Unauthorized(format!("invalid session: {e}")))?;
        Ok(data.claims.into())
    }
}
