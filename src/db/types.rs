//! Values returned by the database probes.

use chrono::{DateTime, SecondsFormat, Utc};
use strum::{Display, IntoStaticStr};

/// Which probe a metric or log line refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum DbProbe {
    /// `SELECT NOW(), version()`.
    ServerInfo,
    /// `SELECT COUNT(*) FROM information_schema.tables`.
    TableCount,
}

/// Result of the introspection query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    /// Server clock, ISO-8601.
    pub current_time: String,
    /// Full `version()` string as reported by the server.
    pub version: String,
}

impl ServerInfo {
    /// Build from the raw row values.
    pub fn from_row(current_time: DateTime<Utc>, version: String) -> Self {
        Self {
            current_time: current_time.to_rfc3339_opts(SecondsFormat::Millis, true),
            version,
        }
    }

    /// Product and release, e.g. `PostgreSQL 14.2`.
    pub fn short_version(&self) -> String {
        short_version(&self.version)
    }
}

/// First two whitespace-delimited tokens of a version banner.
pub fn short_version(version: &str) -> String {
    version.split_whitespace().take(2).collect::<Vec<_>>().join(" ")
}
