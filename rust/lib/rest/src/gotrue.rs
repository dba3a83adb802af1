use serde::Deserialize;

use crate::client::{RestClient, decode};
use crate::error::RestError;

/// The part of a GoTrue user object this service needs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl RestClient {
    /// `POST /auth/v1/signup`. Depending on project settings the
    /// response is either the bare user or a session wrapping it.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, RestError> {
        let resp = self
            .authorize(self.http.post(self.auth_url("signup")))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        user_from_body(decode(resp).await?)
    }

    /// `POST /auth/v1/token?grant_type=password`.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, RestError> {
        let resp = self
            .authorize(self.http.post(self.auth_url("token")))
            .query(&[("grant_type", "password")])
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        user_from_body(decode(resp).await?)
    }

    /// `DELETE /auth/v1/admin/users/{id}`. Needs a service-role key.
    pub async fn delete_user(&self, user_id: &str) -> Result<(), RestError> {
        let resp = self
            .authorize(self.http.delete(self.auth_url(&format!("admin/users/{user_id}"))))
            .send()
            .await?;
        let _: serde_json::Value = decode(resp).await?;
        Ok(())
    }
}

fn user_from_body(body: serde_json::Value) -> Result<AuthUser, RestError> {
    let user = match body.get("user") {
        Some(u) if u.is_object() => u.clone(),
        _ => body,
    };
    serde_json::from_value(user).map_err(|e| RestError::Decode(format!("auth user: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockServer;

    #[test]
    fn user_from_bare_user_object() {
        let body = serde_json::json!({"id": "u-1", "email": "a@b.c", "aud": "authenticated"});
        let user = user_from_body(body).unwrap();
        assert_eq!(user.id, "u-1");
        assert_eq!(user.email.as_deref(), Some("a@b.c"));
    }

    #[test]
    fn user_from_session_wrapper() {
        let body = serde_json::json!({
            "access_token": "jwt",
            "token_type": "bearer",
            "user": {"id": "u-2", "email": "p@q.r"}
        });
        assert_eq!(user_from_body(body).unwrap().id, "u-2");
    }

    #[tokio::test]
    async fn signup_posts_credentials() {
        let server = MockServer::reply(200, serde_json::json!({"id": "u-9", "email": "a@b.co"})).await;
        let user = server.client(0).sign_up("a@b.co", "secret123").await.unwrap();
        assert_eq!(user.id, "u-9");

        let hits = server.hits();
        assert_eq!(hits[0].path, "/auth/v1/signup");
        let body: serde_json::Value = serde_json::from_str(&hits[0].body).unwrap();
        assert_eq!(body["email"], "a@b.co");
    }

    #[tokio::test]
    async fn password_grant_reports_gotrue_message() {
        let server = MockServer::reply(400, serde_json::json!({"error_description": "Invalid login credentials"})).await;
        let err = server.client(2).sign_in_with_password("a@b.co", "nope").await.unwrap_err();
        assert!(matches!(err, RestError::Status { status: 400, ref message } if message == "Invalid login credentials"));

        let hits = server.hits();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].path, "/auth/v1/token");
        assert_eq!(hits[0].query, "grant_type=password");
    }

    #[test]
    fn user_without_id_is_decode_error() {
        let err = user_from_body(serde_json::json!({"user": null})).unwrap_err();
        assert!(matches!(err, RestError::Decode(_)));
    }
}
