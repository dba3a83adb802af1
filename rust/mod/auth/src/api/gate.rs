use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};

use pharmacheck_core::ServiceError;

use crate::api::prefers_html;
use crate::model::Identity;

/// Admits any signed-in user.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Identity);

/// Admits signed-in administrators only.
#[derive(Debug, Clone)]
pub struct AdminOnly(pub Identity);

/// The caller's identity, if any. Never rejects.
#[derive(Debug, Clone)]
pub struct MaybeIdentity(pub Option<Identity>);

/// Gate failure. Page requests are sent to the login page; API requests
/// get the JSON error body with 401 / 403.
#[derive(Debug)]
pub enum GateRejection {
    Unauthenticated { html: bool },
    Forbidden { html: bool },
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        match self {
            GateRejection::Unauthenticated { html: true } | GateRejection::Forbidden { html: true } => {
                Redirect::to("/auth").into_response()
            }
            GateRejection::Unauthenticated { html: false } => {
                ServiceError::Unauthorized("Please log in.".into()).into_response()
            }
            GateRejection::Forbidden { html: false } => {
                ServiceError::PermissionDenied("Administrator role required.".into()).into_response()
            }
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Authenticated {
    type Rejection = GateRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Identity>() {
            Some(identity) => Ok(Authenticated(identity.clone())),
            None => Err(GateRejection::Unauthenticated {
                html: prefers_html(&parts.headers),
            }),
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AdminOnly {
    type Rejection = GateRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Authenticated(identity) = Authenticated::from_request_parts(parts, state).await?;
        if !identity.is_admin() {
            tracing::info!(email = %identity.email, path = %parts.uri.path(), "admin route refused");
            return Err(GateRejection::Forbidden {
                html: prefers_html(&parts.headers),
            });
        }
        Ok(AdminOnly(identity))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for MaybeIdentity {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeIdentity(parts.extensions.get::<Identity>().cloned()))
    }
}
