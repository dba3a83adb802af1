//! Route registration: module routes, dashboard pages and system endpoints.

use axum::Router;
use axum::http::HeaderValue;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use auth::{AdminOnly, AuthModule, Authenticated, Role};

use crate::config::CorsConfig;

/// Build the complete router. Every route sits behind the session
/// middleware so gates see the caller's identity.
pub fn build_router(auth: &AuthModule, module_routes: Vec<(&str, Router)>, cors: CorsLayer) -> Router {
    let mut app = Router::new()
        .route("/", get(index))
        .route("/admin", get(admin_page))
        .route("/admin/add-records", get(add_records_page))
        .route("/pharm", get(pharm_page))
        .route("/health", get(health))
        .route("/version", get(version));

    for (name, router) in module_routes {
        tracing::info!(module = name, "routes mounted");
        app = app.merge(router);
    }

    auth.with_session(app)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub fn cors_layer(config: &CorsConfig) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if config.allowed_origins.is_empty() {
        return Ok(layer.allow_origin(Any));
    }
    let origins = config
        .allowed_origins
        .iter()
        .map(|o| HeaderValue::from_str(o).map_err(|e| anyhow::anyhow!("invalid CORS origin '{}': {}", o, e)))
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

async fn index() -> Redirect {
    Redirect::to("/auth")
}

async fn admin_page(AdminOnly(_): AdminOnly) -> Html<&'static str> {
    Html(include_str!("web/admin.html"))
}

async fn add_records_page(AdminOnly(_): AdminOnly) -> Html<&'static str> {
    Html(include_str!("web/add_records.html"))
}

/// Pharmacist dashboard; other roles are sent back through `/auth`.
async fn pharm_page(Authenticated(identity): Authenticated) -> Response {
    if identity.role != Role::Pharmacist {
        return Redirect::to("/auth").into_response();
    }
    Html(include_str!("web/pharm.html")).into_response()
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "pharmacheckd",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use pharmacheck_core::Module;
    use pharmacheck_sql::SqliteStore;
    use tower::ServiceExt;
    use verify::VerifyModule;
    use verify::service::{VerifyConfig, VerifyService};

    use super::*;
    use crate::bootstrap::sql_stores;
    use crate::config::{ServerConfig, StoreConfig};

    fn app() -> Router {
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        let stores = sql_stores(sql, &StoreConfig::default()).unwrap();
        let auth = AuthModule::new(
            stores.identities,
            auth::service::AuthConfig {
                jwt_secret: "test-secret".into(),
                allow_admin_signup: true,
                ..Default::default()
            },
        );
        let verify = VerifyModule::new(VerifyService::new(stores.records, VerifyConfig::default()));
        let modules = vec![(auth.name(), auth.routes()), (verify.name(), verify.routes())];
        let cors = cors_layer(&ServerConfig::default().cors).unwrap();
        build_router(&auth, modules, cors)
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, serde_json::Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, headers, json)
    }

    fn signup(role: &str, email: &str) -> Request<Body> {
        Request::post("/signup")
            .header("content-type", "application/x-www-form-urlencoded")
            .header("accept", "application/json")
            .body(Body::from(format!("role={role}&email={email}&password=secret123")))
            .unwrap()
    }

    async fn token(app: &Router, role: &str, email: &str) -> String {
        let (status, _, _) = send(app, signup(role, email)).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _, grant) = send(
            app,
            Request::post("/api/login")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({"email": email, "password": "secret123"}).to_string(),
                ))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        grant["access_token"].as_str().unwrap().to_string()
    }

    fn page(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut req = Request::get(uri).header("accept", "text/html");
        if let Some(token) = token {
            req = req.header("authorization", format!("Bearer {token}"));
        }
        req.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_system_endpoints() {
        let app = app();
        let (status, _, body) = send(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (_, _, body) = send(&app, Request::get("/version").body(Body::empty()).unwrap()).await;
        assert_eq!(body["name"], "pharmacheckd");

        let (status, headers, _) = send(&app, page("/", None)).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers["location"], "/auth");
    }

    #[tokio::test]
    async fn test_dashboards_follow_role() {
        let app = app();
        let pharm = token(&app, "Pharmacist", "pharm@example.com").await;
        let admin = token(&app, "Admin", "admin@example.com").await;

        let (status, headers, _) = send(&app, page("/admin", None)).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers["location"], "/auth");

        let (status, _, _) = send(&app, page("/pharm", Some(&pharm))).await;
        assert_eq!(status, StatusCode::OK);
        let (status, headers, _) = send(&app, page("/admin/add-records", Some(&pharm))).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers["location"], "/auth");

        let (status, _, _) = send(&app, page("/admin", Some(&admin))).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _, _) = send(&app, page("/admin/add-records", Some(&admin))).await;
        assert_eq!(status, StatusCode::OK);
        let (status, headers, _) = send(&app, page("/pharm", Some(&admin))).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers["location"], "/auth");
    }

    #[tokio::test]
    async fn test_verify_end_to_end() {
        let app = app();
        let admin = token(&app, "Admin", "admin@example.com").await;
        let pharm = token(&app, "Pharmacist", "pharm@example.com").await;

        let (status, _, _) = send(
            &app,
            Request::post("/admin/add-batch")
                .header("content-type", "application/x-www-form-urlencoded")
                .header("authorization", format!("Bearer {admin}"))
                .body(Body::from("batch_number=BTX-45&manufacturer=PharmaCo&expiry_date=2999-12-31"))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let verify = |code: &str, token: Option<&str>| {
            let mut req = Request::post("/api/verify").header("content-type", "application/json");
            if let Some(token) = token {
                req = req.header("authorization", format!("Bearer {token}"));
            }
            req.body(Body::from(serde_json::json!({"serial": code}).to_string())).unwrap()
        };

        let (status, _, body) = send(&app, verify("BTX-45", Some(&pharm))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "AUTHENTIC");

        let (_, _, body) = send(&app, verify("NOPE-1", Some(&pharm))).await;
        assert_eq!(body["status"], "COUNTERFEIT");

        let (status, _, body) = send(&app, verify("BTX-45", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHENTICATED");

        let (status, _, body) = send(
            &app,
            Request::get("/api/report?start_date=2000-01-01&end_date=2999-12-31")
                .header("authorization", format!("Bearer {admin}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"]["total_queries"], 2);
        assert_eq!(body["summary"]["counterfeit_count"], 1);
    }

    #[test]
    fn test_cors_origins_must_be_header_values() {
        let bad = CorsConfig {
            allowed_origins: vec!["https://ok.example".into(), "bad\norigin".into()],
        };
        assert!(cors_layer(&bad).is_err());
    }
}
