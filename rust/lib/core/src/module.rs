use axum::Router;

/// A service module that contributes HTTP routes.
///
/// Each business module (auth, verify) implements this trait. The binary
/// collects all modules and merges their routes into a single Router,
/// then layers session decoding on top.
pub trait Module: Send + Sync {
    /// Module name, used for logging.
    fn name(&self) -> &str;

    /// Return the module's routes. Paths are absolute (`/api/verify`).
    fn routes(&self) -> Router;
}
