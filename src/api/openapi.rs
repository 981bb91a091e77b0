//! OpenAPI description of the status-reporting endpoints.

use axum::Json;
use utoipa::OpenApi;

use super::handlers;
use super::types::{DataResponse, DatabaseStatus, HealthResponse, StatusResponse};

/// OpenAPI document for `/health`, `/api` and `/api/data`.
#[derive(OpenApi)]
#[openapi(
    paths(handlers::health, handlers::status, handlers::data),
    components(schemas(HealthResponse, StatusResponse, DatabaseStatus, DataResponse)),
    tags((name = "status", description = "Liveness and database connectivity reporting"))
)]
pub struct ApiDoc;

/// Serves the generated document.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
