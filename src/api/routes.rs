//! HTTP API route definitions.

use axum::{extract::DefaultBodyLimit, middleware, routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{data, health, render_metrics, status, track_metrics, AppState};
use super::openapi::openapi_json;

/// Largest accepted JSON request body.
pub const JSON_BODY_LIMIT: usize = 100 * 1024;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoint
        .route("/health", get(health))
        // Status-reporting endpoints
        .route("/api", get(status))
        .route("/api/data", get(data))
        // Operations
        .route("/metrics", get(render_metrics))
        .route("/api-docs/openapi.json", get(openapi_json))
        .route_layer(middleware::from_fn(track_metrics))
        .layer(DefaultBodyLimit::max(JSON_BODY_LIMIT))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
