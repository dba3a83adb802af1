use crate::model::{Profile, Role, SignUp, TokenGrant};
use crate::service::{AuthError, AuthService};

const MIN_PASSWORD_LEN: usize = 6;

impl AuthService {
    /// Register an account and its profile.
    ///
    /// Role defaults to Pharmacist; a license number is kept only for
    /// pharmacists. Admin accounts need `allow_admin_signup`.
    pub async fn sign_up(&self, input: SignUp) -> Result<Profile, AuthError> {
        let email = input.email.trim().to_ascii_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::Validation("a valid email is required".into()));
        }
        if input.password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let role = match input.role.as_deref().map(str::trim) {
            None | Some("") => Role::default(),
            Some(r) => r.parse::<Role>().map_err(AuthError::Validation)?,
        };
        if role == Role::Admin && !self.config.allow_admin_signup {
            return Err(AuthError::Forbidden(
                "administrator accounts cannot be self-registered".into(),
            ));
        }
        let license = match role {
            Role::Pharmacist => input
                .license
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty()),
            Role::Admin => None,
        };

        let user_id = self.identities.create_account(&email, &input.password).await?;
        let profile = Profile {
            user_id,
            email,
            license,
            role,
        };
        if let Err(e) = self.identities.insert_profile(&profile).await {
            if let Err(cleanup) = self.identities.discard_account(&profile.user_id).await {
                tracing::warn!(user_id = %profile.user_id, "account left without a profile: {cleanup}");
            }
            return Err(e);
        }

        tracing::info!(email = %profile.email, role = %profile.role, "account registered");
        Ok(profile)
    }

    /// Check credentials, load the profile, and issue a session token.
    pub async fn login(&self, email: &str, password: &str) -> Result<(Profile, TokenGrant), AuthError> {
        let email = email.trim().to_ascii_lowercase();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::Validation("email and password are required".into()));
        }

        self.identities.check_password(&email, password).await?;
        let profile = self
            .identities
            .profile_by_email(&email)
            .await?
            .ok_or_else(|| AuthError::Unauthorized("Invalid email or password.".into()))?;

        let grant = self.issue_token(&profile)?;
        tracing::info!(email = %profile.email, role = %profile.role, "login");
        Ok((profile, grant))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::service;

    fn form(role: Option<&str>, email: &str, password: &str, license: Option<&str>) -> SignUp {
        SignUp {
            role: role.map(str::to_string),
            license: license.map(str::to_string),
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn signup_then_login() {
        let svc = service(false);
        let profile = svc
            .sign_up(form(None, "Pharm@Example.com", "secret123", Some("LIC-42")))
            .await
            .unwrap();
        assert_eq!(profile.role, Role::Pharmacist);
        assert_eq!(profile.email, "pharm@example.com");
        assert_eq!(profile.license.as_deref(), Some("LIC-42"));

        let (logged_in, grant) = svc.login("pharm@example.com", "secret123").await.unwrap();
        assert_eq!(logged_in, profile);
        let identity = svc.verify_token(&grant.access_token).unwrap();
        assert_eq!(identity.role, Role::Pharmacist);
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let svc = service(false);
        svc.sign_up(form(None, "a@b.co", "secret123", None)).await.unwrap();
        let err = svc.login("a@b.co", "wrong-pass").await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized(_)));
        let err = svc.login("nobody@b.co", "secret123").await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let svc = service(false);
        svc.sign_up(form(None, "a@b.co", "secret123", None)).await.unwrap();
        let err = svc.sign_up(form(None, "A@B.co", "secret456", None)).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict(_)));
    }

    #[tokio::test]
    async fn failed_profile_insert_rolls_back_account() {
        use std::sync::Arc;

        use pharmacheck_sql::{SQLStore, SqliteStore};

        use crate::service::AuthConfig;
        use crate::store::SqlIdentityStore;

        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        let store = SqlIdentityStore::new(sql.clone(), "profiles").unwrap();
        let svc = AuthService::new(
            Arc::new(store),
            AuthConfig {
                jwt_secret: "test-secret".into(),
                ..Default::default()
            },
        );

        // A stray profile row makes the profile insert fail after the
        // account row is written.
        sql.exec(
            "INSERT INTO profiles (user_id, email, license, role) VALUES ('stray', 'a@b.co', NULL, 'Pharmacist')",
            &[],
        )
        .unwrap();
        let err = svc.sign_up(form(None, "a@b.co", "secret123", None)).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict(_)));
        assert!(sql.query("SELECT id FROM accounts", &[]).unwrap().is_empty());

        sql.exec("DELETE FROM profiles", &[]).unwrap();
        let profile = svc.sign_up(form(None, "a@b.co", "secret123", None)).await.unwrap();
        assert_eq!(svc.login("a@b.co", "secret123").await.unwrap().0, profile);
    }

    #[tokio::test]
    async fn admin_signup_is_gated_by_config() {
        let closed = service(false);
        let err = closed
            .sign_up(form(Some("Admin"), "root@b.co", "secret123", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Forbidden(_)));

        let open = service(true);
        let profile = open
            .sign_up(form(Some("Admin"), "root@b.co", "secret123", Some("ignored")))
            .await
            .unwrap();
        assert_eq!(profile.role, Role::Admin);
        assert_eq!(profile.license, None);
    }

    #[tokio::test]
    async fn signup_validates_input() {
        let svc = service(false);
        assert!(matches!(
            svc.sign_up(form(None, "not-an-email", "secret123", None)).await,
            Err(AuthError::Validation(_))
        ));
        assert!(matches!(
            svc.sign_up(form(None, "a@b.co", "123", None)).await,
            Err(AuthError::Validation(_))
        ));
        assert!(matches!(
            svc.sign_up(form(Some("Nurse"), "a@b.co", "secret123", None)).await,
            Err(AuthError::Validation(_))
        ));
    }
}
