//! Unified error types for the backend.

use thiserror::Error;

/// Unified error type for the backend process.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration was loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Database error that escaped a handler boundary (CLI diagnostics only).
    #[error("database error: {0}")]
    Database(#[from] DbError),

    /// HTTP client error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Database unavailable or query failed.
///
/// Handlers never turn this into an HTTP status; its display string is
/// reported in-band instead.
#[derive(Error, Debug)]
pub enum DbError {
    /// Pool acquisition, connection or query failure from the driver.
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    /// Database unreachable for a reason not raised by the driver.
    #[error("{0}")]
    Unavailable(String),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_error_display_is_the_underlying_message() {
        let err = DbError::Unavailable("connect ECONNREFUSED 10.0.0.5:5432".to_string());
        assert_eq!(err.to_string(), "connect ECONNREFUSED 10.0.0.5:5432");

        let err = DbError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.to_string(), sqlx::Error::PoolTimedOut.to_string());
    }

    #[test]
    fn app_error_wraps_db_error() {
        let err: AppError = DbError::Unavailable("down".to_string()).into();
        assert_eq!(err.to_string(), "database error: down");
    }
}
