//! PostgreSQL connection pool adapter.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::PgConnection;
use tokio::net::TcpStream;
use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::error::DbError;
use crate::metrics;

use super::types::{DbProbe, ServerInfo};
use super::Database;

/// Introspection query for `GET /api`.
pub const SERVER_INFO_QUERY: &str = "SELECT NOW() AS current_time, version() AS pg_version";

/// Catalog row count for `GET /api/data`.
pub const TABLE_COUNT_QUERY: &str = "SELECT COUNT(*) AS count FROM information_schema.tables";

/// Upper bound for the reachability check run after a pool timeout.
const DIAGNOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Process-wide pool of PostgreSQL connections.
#[derive(Debug, Clone)]
pub struct PgDatabase {
    pool: PgPool,
    host: String,
    port: u16,
}

impl PgDatabase {
    /// Build the pool without opening any connection.
    ///
    /// Connections are established on first use, so the server starts even
    /// while the database is down.
    pub fn connect_lazy(config: &Config) -> Self {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect_lazy_with(config.connect_options());

        info!(
            database = %config.db_display(),
            max_connections = config.db_max_connections,
            "Database pool configured"
        );

        Self {
            pool,
            host: config.db_host.clone(),
            port: config.db_port,
        }
    }

    /// Underlying pool handle.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close all pooled connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Acquire one connection, run `f` on it, release it.
    ///
    /// The pooled connection goes back to the pool on every exit path,
    /// including when `f` fails or the request future is dropped.
    pub async fn with_connection<T, F>(&self, probe: DbProbe, f: F) -> Result<T, DbError>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<T, sqlx::Error>> + Send,
    {
        let _timer = metrics::timer_db_probe(probe);

        let result: Result<T, sqlx::Error> = async {
            let mut conn = self.pool.acquire().await?;
            let out = f(&mut *conn).await;
            drop(conn);
            out
        }
        .await;

        match result {
            Ok(value) => Ok(value),
            Err(err) => {
                metrics::inc_db_probe_failures(probe);
                Err(self.diagnose(err).await)
            }
        }
    }

    /// Attach the socket-level cause to a pool timeout.
    ///
    /// The pool retries refused connects until the acquire deadline and then
    /// reports only the timeout, which hides why the database is unreachable.
    async fn diagnose(&self, err: sqlx::Error) -> DbError {
        if !matches!(err, sqlx::Error::PoolTimedOut) {
            return DbError::from(err);
        }

        let addr = (self.host.as_str(), self.port);
        match tokio::time::timeout(DIAGNOSE_TIMEOUT, TcpStream::connect(addr)).await {
            Ok(Ok(_)) => DbError::from(err),
            Ok(Err(io)) => DbError::Unavailable(format!(
                "{err}: connect {}:{}: {io}",
                self.host, self.port
            )),
            Err(_) => DbError::Unavailable(format!(
                "{err}: connect {}:{}: timed out",
                self.host, self.port
            )),
        }
    }
}

#[async_trait]
impl Database for PgDatabase {
    #[instrument(skip(self))]
    async fn server_info(&self) -> Result<ServerInfo, DbError> {
        let (current_time, version) = self
            .with_connection(DbProbe::ServerInfo, |conn| {
                Box::pin(async move {
                    sqlx::query_as::<_, (DateTime<Utc>, String)>(SERVER_INFO_QUERY)
                        .fetch_one(conn)
                        .await
                })
            })
            .await?;

        debug!(%current_time, %version, "Server info fetched");
        Ok(ServerInfo::from_row(current_time, version))
    }

    #[instrument(skip(self))]
    async fn table_count(&self) -> Result<i64, DbError> {
        let (count,) = self
            .with_connection(DbProbe::TableCount, |conn| {
                Box::pin(async move {
                    sqlx::query_as::<_, (i64,)>(TABLE_COUNT_QUERY)
                        .fetch_one(conn)
                        .await
                })
            })
            .await?;

        debug!(count, "Table count fetched");
        Ok(count)
    }
}
