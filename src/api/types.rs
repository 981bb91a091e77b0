//! Response documents of the status-reporting contract.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::ServerInfo;
use crate::error::DbError;

/// `/health` status value.
pub const HEALTH_STATUS: &str = "OK";
/// `/api` message.
pub const STATUS_MESSAGE: &str = "Backend API is running!";
/// `/api/data` payload.
pub const SAMPLE_DATA: &str = "Sample data for load testing";

/// `GET /health` response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always "OK".
    pub status: String,
    /// ISO-8601 time of the response.
    pub timestamp: String,
}

/// `GET /api` response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub message: String,
    /// Responding instance.
    pub hostname: String,
    pub timestamp: String,
    pub database: DatabaseStatus,
}

/// Outcome of the connectivity check.
///
/// Either `current_time` and `version` are set, or `error` is; use the
/// constructors rather than building this by hand.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DatabaseStatus {
    pub connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_time: Option<String>,
    /// Product and release only, e.g. "PostgreSQL 14.2".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DatabaseStatus {
    /// Database answered the introspection query.
    pub fn connected(info: &ServerInfo) -> Self {
        Self {
            connected: true,
            current_time: Some(info.current_time.clone()),
            version: Some(info.short_version()),
            error: None,
        }
    }

    /// Database unavailable or the query failed.
    pub fn disconnected(err: &DbError) -> Self {
        Self {
            connected: false,
            current_time: None,
            version: None,
            error: Some(err.to_string()),
        }
    }
}

/// `GET /api/data` response.
///
/// Exactly one of `table_count` and `database_error` is present.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DataResponse {
    pub data: String,
    pub timestamp: String,
    pub hostname: String,
    /// Fresh value in [0, 1) per request.
    pub random: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_error: Option<String>,
}

impl DataResponse {
    /// Build the sample payload from the row-count outcome.
    pub fn new(
        timestamp: String,
        hostname: String,
        random: f64,
        table_count: Result<i64, DbError>,
    ) -> Self {
        let (table_count, database_error) = match table_count {
            Ok(count) => (Some(count), None),
            Err(e) => (None, Some(e.to_string())),
        };

        Self {
            data: SAMPLE_DATA.to_string(),
            timestamp,
            hostname,
            random,
            table_count,
            database_error,
        }
    }
}
