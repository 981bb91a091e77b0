//! HTTP API module for the health, status and sample data endpoints.

pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod types;

pub use handlers::AppState;
pub use routes::create_router;
