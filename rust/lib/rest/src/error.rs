use thiserror::Error;

#[derive(Error, Debug)]
pub enum RestError {
    /// Transport failure: connect, TLS, timeout.
    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("decode: {0}")]
    Decode(String),

    /// Invalid client configuration.
    #[error("config: {0}")]
    Config(String),
}

impl RestError {
    /// Whether repeating the same idempotent request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            RestError::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            RestError::Status { status, .. } => *status == 429 || *status >= 500,
            RestError::Decode(_) | RestError::Config(_) => false,
        }
    }

    /// PostgREST reports unique violations as 409.
    pub fn is_conflict(&self) -> bool {
        matches!(self, RestError::Status { status: 409, .. })
    }
}
