//! Auth module: accounts, roles and request-scoped sessions.
//!
//! # Pieces
//!
//! - **Profile** — email, role (Admin / Pharmacist) and license number
//! - **IdentityStore** — credential + profile backend (GoTrue or local argon2)
//! - **Session** — HS256 JWT carried as a Bearer token or cookie
//! - **Gate** — `Authenticated` / `AdminOnly` extractors
//!
//! # Usage
//!
//! ```ignore
//! use auth::{AuthModule, service::AuthConfig, store::SqlIdentityStore};
//!
//! let identities = Arc::new(SqlIdentityStore::new(sql, "profiles")?);
//! let module = AuthModule::new(identities, AuthConfig::default());
//! let app = module.with_session(router.merge(module.routes()));
//! ```

pub mod api;
pub mod model;
pub mod service;
pub mod store;

use std::sync::Arc;

use axum::Router;

use pharmacheck_core::Module;

use crate::service::{AuthConfig, AuthService};
use crate::store::IdentityStore;

pub use api::{AdminOnly, Authenticated, MaybeIdentity};
pub use model::{Identity, Role};

/// Auth module implementing the Module trait.
pub struct AuthModule {
    service: Arc<AuthService>,
}

impl AuthModule {
    pub fn new(identities: Arc<dyn IdentityStore>, config: AuthConfig) -> Self {
        Self {
            service: AuthService::new(identities, config),
        }
    }

    pub fn service(&self) -> &Arc<AuthService> {
        &self.service
    }

    /// Wrap a router so every request carries the caller's `Identity`
    /// when it presents a valid session.
    pub fn with_session(&self, router: Router) -> Router {
        router.layer(axum::middleware::from_fn_with_state(
            self.service.clone(),
            api::session_middleware,
        ))
    }
}

impl Module for AuthModule {
    fn name(&self) -> &str {
        "auth"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone())
    }
}
