use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use axum_extra::extract::{CookieJar, WithRejection};
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::Deserialize;

use pharmacheck_core::ServiceError;

use crate::api::{AppState, MaybeIdentity, SESSION_COOKIE, prefers_html, redirect_with};
use crate::model::{SignUp, TokenGrant};
use crate::service::AuthService;

const AUTH_PAGE: &str = include_str!("../web/auth.html");

#[derive(Debug, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth", get(auth_page))
        .route("/signup", post(signup))
        .route("/login", post(login_form))
        .route("/api/login", post(login_json))
        .route("/logout", get(logout))
}

/// GET /auth: signed-in users go straight to their dashboard.
async fn auth_page(MaybeIdentity(identity): MaybeIdentity) -> Response {
    match identity {
        Some(id) => Redirect::to(id.role.dashboard()).into_response(),
        None => Html(AUTH_PAGE).into_response(),
    }
}

/// POST /signup (form).
async fn signup(
    State(svc): State<AppState>,
    headers: HeaderMap,
    WithRejection(Form(form), _): WithRejection<Form<SignUp>, ServiceError>,
) -> Response {
    let html = prefers_html(&headers);
    match svc.sign_up(form).await {
        Ok(_) if html => {
            redirect_with("/auth", "notice", "Account created. Please log in.").into_response()
        }
        Ok(profile) => (StatusCode::CREATED, Json(profile)).into_response(),
        Err(e) if html => redirect_with("/auth", "error", &e.to_string()).into_response(),
        Err(e) => ServiceError::from(e).into_response(),
    }
}

/// POST /login (form): sets the session cookie and sends the browser to
/// the dashboard for its role.
async fn login_form(
    State(svc): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    WithRejection(Form(form), _): WithRejection<Form<Credentials>, ServiceError>,
) -> Response {
    let html = prefers_html(&headers);
    match svc.login(&form.email, &form.password).await {
        Ok((profile, grant)) => {
            let jar = jar.add(session_cookie(&svc, &grant));
            if html {
                (jar, Redirect::to(profile.role.dashboard())).into_response()
            } else {
                (jar, Json(grant)).into_response()
            }
        }
        Err(e) => {
            tracing::info!(email = %form.email, "login failed: {e}");
            if html {
                redirect_with("/auth", "error", &e.to_string()).into_response()
            } else {
                ServiceError::from(e).into_response()
            }
        }
    }
}

/// POST /api/login (JSON) for API clients.
async fn login_json(
    State(svc): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<Credentials>, ServiceError>,
) -> Result<Json<TokenGrant>, ServiceError> {
    let (_, grant) = svc.login(&body.email, &body.password).await?;
    Ok(Json(grant))
}

async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Redirect::to("/auth"))
}

fn session_cookie(svc: &AuthService, grant: &TokenGrant) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, grant.access_token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(svc.config().secure_cookie)
        .build()
}
