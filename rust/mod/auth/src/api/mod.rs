mod gate;
mod login;
mod middleware;

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderMap;
use axum::http::header::ACCEPT;
use axum::response::Redirect;

use crate::service::AuthService;

pub use gate::{AdminOnly, Authenticated, GateRejection, MaybeIdentity};
pub use middleware::{SESSION_COOKIE, session_middleware};

/// Shared application state.
pub type AppState = Arc<AuthService>;

/// Build the auth page and login routes.
///
/// Session decoding is not applied here; the binary layers
/// [`session_middleware`] over the merged router so every module sees
/// the same `Identity`.
pub fn build_router(svc: AppState) -> Router {
    login::routes().with_state(svc)
}

/// Whether the client wants a page rather than JSON. Browsers send
/// `text/html` in `Accept` for navigations and form posts.
pub fn prefers_html(headers: &HeaderMap) -> bool {
    headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("text/html"))
}

/// 303 redirect to `path?key=message`, used to flash a notice or error
/// on the target page.
pub fn redirect_with(path: &str, key: &str, message: &str) -> Redirect {
    let query = serde_urlencoded::to_string([(key, message)]).unwrap_or_default();
    Redirect::to(&format!("{path}?{query}"))
}
