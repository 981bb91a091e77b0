//! Mock database for unit testing.
//!
//! This module provides a mock that can be used in tests
//! without a running PostgreSQL server.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::DbError;

use super::types::ServerInfo;
use super::Database;

/// Configuration for mock database behavior.
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Server time to report.
    pub current_time: String,
    /// Version banner to report.
    pub version: String,
    /// Table count reported by the first call; each later call adds one.
    pub table_count: i64,
    /// Simulated latency in milliseconds.
    pub latency_ms: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            current_time: "2024-01-01T00:00:00Z".to_string(),
            version: "PostgreSQL 14.2 (Debian 14.2-1.pgdg110+1) on x86_64-pc-linux-gnu".to_string(),
            table_count: 200,
            latency_ms: 0,
        }
    }
}

/// Mock database for testing.
#[derive(Debug, Clone)]
pub struct MockDatabase {
    /// Mock configuration.
    config: MockConfig,
    /// When set, every probe fails with this message.
    failure: Arc<Mutex<Option<String>>>,
    /// Next table count to hand out.
    next_count: Arc<AtomicI64>,
    /// Number of probes served, successful or not.
    calls: Arc<AtomicU64>,
}

impl MockDatabase {
    /// Create a new mock database with default configuration.
    pub fn new() -> Self {
        Self::with_config(MockConfig::default())
    }

    /// Create a mock database with custom configuration.
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            next_count: Arc::new(AtomicI64::new(config.table_count)),
            config,
            failure: Arc::new(Mutex::new(None)),
            calls: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Create a mock database whose probes all fail.
    pub fn unavailable(message: impl Into<String>) -> Self {
        let db = Self::new();
        db.fail_with(message);
        db
    }

    /// Make every subsequent probe fail with `message`.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.lock_failure() = Some(message.into());
    }

    /// Make subsequent probes succeed again.
    pub fn recover(&self) {
        *self.lock_failure() = None;
    }

    /// Number of probes served so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    fn lock_failure(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.failure
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn round_trip(&self) -> Result<(), DbError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.config.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.config.latency_ms)).await;
        }

        let failure = self.lock_failure().clone();
        match failure {
            Some(message) => Err(DbError::Unavailable(message)),
            None => Ok(()),
        }
    }
}

impl Default for MockDatabase {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Database for MockDatabase {
    async fn server_info(&self) -> Result<ServerInfo, DbError> {
        self.round_trip().await?;

        Ok(ServerInfo {
            current_time: self.config.current_time.clone(),
            version: self.config.version.clone(),
        })
    }

    async fn table_count(&self) -> Result<i64, DbError> {
        self.round_trip().await?;
        Ok(self.next_count.fetch_add(1, Ordering::SeqCst))
    }
}
