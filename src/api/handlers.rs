//! HTTP API handlers.
//!
//! Database failures never change the HTTP status: `/api` and `/api/data`
//! answer 200 and report the failure inside the body.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::{error, warn};

use crate::db::Database;
use crate::metrics;
use crate::utils::iso_timestamp;

use super::types::{
    DataResponse, DatabaseStatus, HealthResponse, StatusResponse, HEALTH_STATUS, STATUS_MESSAGE,
};

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Process-wide database handle.
    pub db: Arc<dyn Database>,
    /// Identity reported in responses.
    pub hostname: Arc<str>,
    /// Renders `/metrics`; `None` when no recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state.
    pub fn new(db: Arc<dyn Database>, hostname: impl Into<Arc<str>>) -> Self {
        Self {
            db,
            hostname: hostname.into(),
            metrics: None,
        }
    }

    /// Attach a Prometheus handle for `/metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health check handler - always returns 200, never touches the database.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Process is alive", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: HEALTH_STATUS.to_string(),
        timestamp: iso_timestamp(),
    })
}

/// Status handler - liveness plus a best-effort database check.
#[utoipa::path(
    get,
    path = "/api",
    responses((status = 200, description = "Liveness and database connectivity", body = StatusResponse))
)]
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let database = match state.db.server_info().await {
        Ok(info) => DatabaseStatus::connected(&info),
        Err(e) => {
            error!(error = %e, "Database connection error");
            DatabaseStatus::disconnected(&e)
        }
    };

    Json(StatusResponse {
        message: STATUS_MESSAGE.to_string(),
        hostname: state.hostname.to_string(),
        timestamp: iso_timestamp(),
        database,
    })
}

/// Sample data handler - fixed payload plus a best-effort row count.
#[utoipa::path(
    get,
    path = "/api/data",
    responses((status = 200, description = "Sample payload for load testing", body = DataResponse))
)]
pub async fn data(State(state): State<AppState>) -> Json<DataResponse> {
    let table_count = state.db.table_count().await;
    if let Err(e) = &table_count {
        warn!(error = %e, "Table count query failed");
    }

    Json(DataResponse::new(
        iso_timestamp(),
        state.hostname.to_string(),
        rand::random::<f64>(),
        table_count,
    ))
}

/// Prometheus exposition.
pub async fn render_metrics(State(state): State<AppState>) -> impl IntoResponse {
    state
        .metrics
        .as_ref()
        .map(PrometheusHandle::render)
        .unwrap_or_default()
}

/// Records latency and volume for matched routes.
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let endpoint = req
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    let response = next.run(req).await;

    metrics::record_http_latency(start, &endpoint);
    metrics::inc_http_requests(&endpoint);

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockDatabase;

    #[tokio::test]
    async fn status_reports_connected_database() {
        let state = AppState::new(Arc::new(MockDatabase::new()), "backend-0");

        let Json(body) = status(State(state)).await;

        assert!(body.database.connected);
        assert_eq!(body.database.version.as_deref(), Some("PostgreSQL 14.2"));
        assert!(body.database.error.is_none());
        assert_eq!(body.hostname, "backend-0");
    }

    #[tokio::test]
    async fn status_reports_failure_in_band() {
        let db = MockDatabase::unavailable("connect ECONNREFUSED 10.0.0.5:5432");
        let state = AppState::new(Arc::new(db), "backend-0");

        let Json(body) = status(State(state)).await;

        assert!(!body.database.connected);
        assert!(body.database.current_time.is_none());
        assert!(body.database.version.is_none());
        assert_eq!(
            body.database.error.as_deref(),
            Some("connect ECONNREFUSED 10.0.0.5:5432")
        );
    }

    #[tokio::test]
    async fn data_performs_one_round_trip() {
        let db = MockDatabase::new();
        let state = AppState::new(Arc::new(db.clone()), "backend-0");

        let Json(body) = data(State(state)).await;

        assert_eq!(db.calls(), 1);
        assert!((0.0..1.0).contains(&body.random));
        assert_eq!(body.table_count, Some(200));
    }

    #[tokio::test]
    async fn health_needs_no_state() {
        let Json(body) = health().await;
        assert_eq!(body.status, "OK");
    }
}
