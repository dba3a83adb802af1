mod records;
mod reports;
mod verify;

use std::sync::Arc;

use axum::Router;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};

use crate::service::VerifyService;

/// Shared application state.
pub type AppState = Arc<VerifyService>;

/// Build the verification, reporting and record-entry routes.
///
/// Every handler declares its gate through `Authenticated` or `AdminOnly`;
/// the session middleware must be layered outside this router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(verify::routes())
        .merge(reports::routes())
        .merge(records::routes())
        .with_state(state)
}

fn pdf_attachment(bytes: Vec<u8>, file_name: &str) -> Response {
    (
        [
            (CONTENT_TYPE, "application/pdf".to_string()),
            (CONTENT_DISPOSITION, format!("attachment; filename=\"{file_name}\"")),
        ],
        bytes,
    )
        .into_response()
}

#[cfg(test)]
pub(crate) mod testing {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::{Extension, Router};
    use tower::ServiceExt;

    use auth::{Identity, Role};

    use crate::service::VerifyService;

    pub fn app(svc: VerifyService, role: Option<Role>) -> Router {
        let router = super::router(std::sync::Arc::new(svc));
        match role {
            Some(role) => router.layer(Extension(Identity {
                user_id: "u-1".into(),
                email: format!("{}@pharmacheck.test", role.as_str().to_lowercase()),
                role,
            })),
            None => router,
        }
    }

    pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, headers, body.to_vec())
    }

    pub fn json(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    pub fn form(uri: &str, body: &str, accept: &str) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/x-www-form-urlencoded")
            .header("accept", accept)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub fn body_json(body: &[u8]) -> serde_json::Value {
        serde_json::from_slice(body).unwrap()
    }
}
