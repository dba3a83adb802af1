use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use serde_json::{Value, json};

use auth::{AdminOnly, Authenticated};
use pharmacheck_core::{DateRange, ServiceError};

use super::{AppState, pdf_attachment};
use crate::model::{IncidentForm, IncidentRow, ReportRow};
use crate::report;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/report", get(query_report).post(submit_incident))
        .route("/api/generate_pdf", post(query_report_pdf))
        .route("/api/report2", get(incident_report))
        .route("/api/generate_pdf_2", post(incident_report_pdf))
}

#[derive(Deserialize)]
struct RangeQuery {
    start_date: Option<String>,
    end_date: Option<String>,
}

impl RangeQuery {
    fn range(&self) -> Result<DateRange, ServiceError> {
        DateRange::parse(self.start_date.as_deref(), self.end_date.as_deref())
    }
}

/// Body of the PDF endpoints: rows as previously returned by the JSON
/// report, plus the period they cover.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PdfRequest<T> {
    report_data: Option<Vec<T>>,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
}

impl<T> PdfRequest<T> {
    fn rows(&mut self) -> Result<Vec<T>, ServiceError> {
        self.report_data
            .take()
            .ok_or_else(|| ServiceError::Validation("No report data provided.".into()))
    }
}

#[derive(Deserialize)]
struct IncidentBody {
    #[serde(default)]
    form_data: IncidentForm,
}

/// GET /api/report: aggregated query logs for a date range.
async fn query_report(
    State(svc): State<AppState>,
    AdminOnly(_): AdminOnly,
    Query(q): Query<RangeQuery>,
) -> Result<Json<Value>, ServiceError> {
    let (rows, summary) = svc.query_report(&q.range()?).await?;
    Ok(Json(json!({ "reportData": rows, "summary": summary })))
}

/// POST /api/generate_pdf
async fn query_report_pdf(
    AdminOnly(_): AdminOnly,
    WithRejection(Json(mut body), _): WithRejection<Json<PdfRequest<ReportRow>>, ServiceError>,
) -> Result<Response, ServiceError> {
    let rows = body.rows()?;
    let (start, end) = (body.start_date.as_deref(), body.end_date.as_deref());
    let pdf = report::query_log_report(&rows, start, end).to_pdf()?;
    Ok(pdf_attachment(pdf, &report::query_log_file_name(start, end)))
}

/// POST /api/report: file an incident.
async fn submit_incident(
    State(svc): State<AppState>,
    Authenticated(_): Authenticated,
    WithRejection(Json(body), _): WithRejection<Json<IncidentBody>, ServiceError>,
) -> Result<(StatusCode, Json<Value>), ServiceError> {
    let stored = svc.submit_incident(body.form_data).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Report added successfully!", "data": [stored] })),
    ))
}

/// GET /api/report2: incidents filed in a date range.
async fn incident_report(
    State(svc): State<AppState>,
    AdminOnly(_): AdminOnly,
    Query(q): Query<RangeQuery>,
) -> Result<Json<Vec<IncidentRow>>, ServiceError> {
    Ok(Json(svc.incident_rows(&q.range()?).await?))
}

/// POST /api/generate_pdf_2
async fn incident_report_pdf(
    AdminOnly(_): AdminOnly,
    WithRejection(Json(mut body), _): WithRejection<Json<PdfRequest<IncidentRow>>, ServiceError>,
) -> Result<Response, ServiceError> {
    let rows = body.rows()?;
    let (start, end) = (body.start_date.as_deref(), body.end_date.as_deref());
    let pdf = report::incident_export(&rows, start, end).to_pdf()?;
    Ok(pdf_attachment(pdf, &report::incident_file_name(start, end)))
}
