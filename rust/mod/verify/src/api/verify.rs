use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use serde_json::{Value, json};

use auth::Authenticated;
use pharmacheck_core::ServiceError;

use super::AppState;
use crate::model::LogEntry;
use crate::service::Verification;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/verify", post(verify))
        .route("/api/log", post(log))
}

#[derive(Deserialize)]
struct VerifyBody {
    #[serde(default)]
    serial: Option<String>,
}

async fn verify(
    State(svc): State<AppState>,
    Authenticated(caller): Authenticated,
    WithRejection(Json(body), _): WithRejection<Json<VerifyBody>, ServiceError>,
) -> Result<Json<Verification>, ServiceError> {
    let code = body.serial.unwrap_or_default();
    Ok(Json(svc.verify(&code, &caller).await?))
}

async fn log(
    State(svc): State<AppState>,
    Authenticated(caller): Authenticated,
    WithRejection(Json(entry), _): WithRejection<Json<LogEntry>, ServiceError>,
) -> Result<(StatusCode, Json<Value>), ServiceError> {
    svc.record_log(entry, &caller).await?;
    Ok((StatusCode::CREATED, Json(json!({ "success": true }))))
}

#[cfg(test)]
mod tests {
    use auth::Role;
    use serde_json::json;

    use crate::api::testing::{app, body_json, json as json_req, send};
    use crate::service::testing::{batch, serial, service};

    #[tokio::test]
    async fn verify_returns_resolver_response() {
        let svc = service(true);
        svc.store.insert_batch(&batch("BTX-45", "2026-10-01")).await.unwrap();
        svc.store.insert_serial(&serial("A1234567890", "BTX-45")).await.unwrap();
        let app = app(svc, Some(Role::Pharmacist));

        let (status, _, body) = send(&app, json_req("POST", "/api/verify", json!({"serial": "A1234567890"}))).await;
        assert_eq!(status, 200);
        let v = body_json(&body);
        assert_eq!(v["status"], "AUTHENTIC");
        assert_eq!(v["batch"], "BTX-45");
        assert_eq!(v["serial"], "A1234567890");
        assert_eq!(v["user"], "pharmacist@pharmacheck.test");

        let (status, _, body) = send(&app, json_req("POST", "/api/verify", json!({"serial": "ZZZ"}))).await;
        assert_eq!(status, 200);
        assert_eq!(body_json(&body), json!({"status": "COUNTERFEIT", "user": "pharmacist@pharmacheck.test"}));
    }

    #[tokio::test]
    async fn verify_requires_session() {
        let app = app(service(false), None);
        let (status, _, body) = send(&app, json_req("POST", "/api/verify", json!({"serial": "X"}))).await;
        assert_eq!(status, 401);
        assert_eq!(body_json(&body)["code"], "UNAUTHENTICATED");
    }

    #[tokio::test]
    async fn empty_code_is_400() {
        let app = app(service(false), Some(Role::Pharmacist));
        let (status, _, _) = send(&app, json_req("POST", "/api/verify", json!({}))).await;
        assert_eq!(status, 400);
    }

    #[tokio::test]
    async fn mistyped_body_is_json_validation_error() {
        let app = app(service(false), Some(Role::Pharmacist));
        let (status, headers, body) = send(&app, json_req("POST", "/api/verify", json!({"serial": 123}))).await;
        assert_eq!(status, 400);
        assert_eq!(headers["content-type"], "application/json");
        let v = body_json(&body);
        assert_eq!(v["code"], "VALIDATION_FAILED");
        assert!(v["message"].as_str().unwrap().contains("serial"));
    }

    #[tokio::test]
    async fn explicit_log_endpoint() {
        let app = app(service(false), Some(Role::Pharmacist));
        let (status, _, body) = send(
            &app,
            json_req(
                "POST",
                "/api/log",
                json!({"serial": "S1", "status": "AUTHENTIC", "timestamp": "2025-04-01T10:00:00Z"}),
            ),
        )
        .await;
        assert_eq!(status, 201);
        assert_eq!(body_json(&body), json!({"success": true}));

        let (status, _, _) = send(&app, json_req("POST", "/api/log", json!({"serial": "S1"}))).await;
        assert_eq!(status, 400);
    }
}
