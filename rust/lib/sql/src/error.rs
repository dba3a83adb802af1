use thiserror::Error;

#[derive(Error, Debug)]
pub enum SQLError {
    #[error("query error: {0}")]
    Query(String),

    #[error("execution error: {0}")]
    Execution(String),

    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("connection error: {0}")]
    Connection(String),
}

impl SQLError {
    /// Classify a rusqlite failure raised while executing a statement.
    pub(crate) fn from_exec(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(code, msg)
                if code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                SQLError::UniqueViolation(msg.unwrap_or_else(|| code.to_string()))
            }
            other => SQLError::Execution(other.to_string()),
        }
    }
}
