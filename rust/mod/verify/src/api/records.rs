use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Form, Json, Router};
use axum_extra::extract::WithRejection;
use serde::Serialize;

use auth::AdminOnly;
use auth::api::{prefers_html, redirect_with};
use pharmacheck_core::ServiceError;

use super::AppState;
use crate::model::{BatchForm, SerialForm};

/// Page the record forms live on; HTML submissions are sent back here.
const ADD_RECORDS: &str = "/admin/add-records";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/add-batch", post(add_batch))
        .route("/admin/add-serial", post(add_serial))
}

async fn add_batch(
    State(svc): State<AppState>,
    AdminOnly(_): AdminOnly,
    headers: HeaderMap,
    WithRejection(Form(form), _): WithRejection<Form<BatchForm>, ServiceError>,
) -> Response {
    let what = format!("batch {}", form.batch_number.trim());
    respond(prefers_html(&headers), &what, svc.add_batch(form).await)
}

async fn add_serial(
    State(svc): State<AppState>,
    AdminOnly(_): AdminOnly,
    headers: HeaderMap,
    WithRejection(Form(form), _): WithRejection<Form<SerialForm>, ServiceError>,
) -> Response {
    let what = format!("serial {}", form.serial_no.trim());
    respond(prefers_html(&headers), &what, svc.add_serial(form).await)
}

fn respond<T: Serialize>(html: bool, what: &str, result: Result<T, ServiceError>) -> Response {
    match result {
        Ok(_) if html => {
            redirect_with(ADD_RECORDS, "notice", &format!("Added {what} successfully.")).into_response()
        }
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) if html => {
            redirect_with(ADD_RECORDS, "error", &format!("Error adding {what}: {e}")).into_response()
        }
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use auth::Role;

    use crate::api::testing::{app, body_json, form, send};
    use crate::service::testing::service;

    #[tokio::test]
    async fn html_form_redirects_with_notice() {
        let admin = app(service(false), Some(Role::Admin));
        let (status, headers, _) = send(
            &admin,
            form(
                "/admin/add-batch",
                "batch_number=BTX-45&manufacturer=PharmaCo&expiry_date=2026-10-01&delivery_date=2024-02-01T09%3A30",
                "text/html",
            ),
        )
        .await;
        assert_eq!(status, 303);
        let location = headers["location"].to_str().unwrap();
        assert!(location.starts_with("/admin/add-records?notice="), "{location}");

        let (status, headers, _) = send(
            &admin,
            form("/admin/add-batch", "batch_number=BTX-45&manufacturer=PharmaCo&expiry_date=2026-10-01", "text/html"),
        )
        .await;
        assert_eq!(status, 303);
        assert!(headers["location"].to_str().unwrap().starts_with("/admin/add-records?error="));
    }

    #[tokio::test]
    async fn api_client_gets_json() {
        let admin = app(service(false), Some(Role::Admin));
        let (status, _, body) = send(
            &admin,
            form(
                "/admin/add-serial",
                "serial_no=A1234567890&batch_number=BTX-45&units_per_pack=21&packs_per_box=",
                "application/json",
            ),
        )
        .await;
        assert_eq!(status, 201);
        let record = body_json(&body);
        assert_eq!(record["units_per_pack"], 21);
        assert!(record["packs_per_box"].is_null());

        let (status, _, body) = send(&admin, form("/admin/add-serial", "serial_no=A2", "application/json")).await;
        assert_eq!(status, 400);
        assert_eq!(body_json(&body)["code"], "VALIDATION_FAILED");
    }

    #[tokio::test]
    async fn record_entry_is_admin_only() {
        let pharm = app(service(false), Some(Role::Pharmacist));
        let (status, _, _) = send(
            &pharm,
            form("/admin/add-batch", "batch_number=B&manufacturer=M&expiry_date=2026-01-01", "application/json"),
        )
        .await;
        assert_eq!(status, 403);

        let anon = app(service(false), None);
        let (status, headers, _) = send(
            &anon,
            form("/admin/add-batch", "batch_number=B&manufacturer=M&expiry_date=2026-01-01", "text/html"),
        )
        .await;
        assert_eq!(status, 303);
        assert_eq!(headers["location"], "/auth");
    }
}
