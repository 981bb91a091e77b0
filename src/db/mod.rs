//! Database access for the status endpoints.
//!
//! This module handles:
//! - The `Database` seam the handlers probe through
//! - The PostgreSQL connection pool adapter
//! - Mock database for testing

pub mod mock;
pub mod pool;
pub mod types;

use async_trait::async_trait;

use crate::error::DbError;

pub use mock::{MockConfig, MockDatabase};
pub use pool::PgDatabase;
pub use types::{DbProbe, ServerInfo};

/// Best-effort database probes used by the HTTP handlers.
///
/// Each call performs at most one round trip and never retries.
#[async_trait]
pub trait Database: Send + Sync + 'static {
    /// Current server time and version string.
    async fn server_info(&self) -> Result<ServerInfo, DbError>;

    /// Number of rows in the `information_schema.tables` catalog.
    async fn table_count(&self) -> Result<i64, DbError>;
}
