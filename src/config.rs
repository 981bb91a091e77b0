//! Application configuration loaded from environment variables.

use std::time::Duration;

use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Database ===
    /// Database host.
    #[serde(default = "default_db_host")]
    pub db_host: String,

    /// Database port.
    #[serde(default = "default_db_port")]
    pub db_port: u16,

    /// Database user.
    #[serde(default = "default_db_user")]
    pub db_user: String,

    /// Database password.
    #[serde(default = "default_db_password")]
    pub db_password: String,

    /// Database name.
    #[serde(default = "default_db_name")]
    pub db_name: String,

    /// Maximum number of pooled connections.
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// Seconds to wait for a pooled connection before giving up.
    ///
    /// While the database refuses connections, every `/api` and `/api/data`
    /// request waits this long, plus up to one second for the reachability
    /// check, before answering with the in-band error. Lower it where a fast
    /// degraded answer matters more than riding out a database restart.
    #[serde(default = "default_db_acquire_timeout")]
    pub db_acquire_timeout_secs: u64,

    // === Server Configuration ===
    /// HTTP listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Environment label, logged at startup.
    #[serde(default = "default_app_env")]
    pub app_env: String,

    /// Instance identity reported in responses; falls back to the system hostname.
    #[serde(default)]
    pub hostname: Option<String>,
}

fn default_db_host() -> String {
    "db".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_db_user() -> String {
    "postgres".to_string()
}

fn default_db_password() -> String {
    "password".to_string()
}

fn default_db_name() -> String {
    "scalable_app".to_string()
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_db_acquire_timeout() -> u64 {
    5
}

fn default_port() -> u16 {
    3000
}

fn default_app_env() -> String {
    "development".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_host: default_db_host(),
            db_port: default_db_port(),
            db_user: default_db_user(),
            db_password: default_db_password(),
            db_name: default_db_name(),
            db_max_connections: default_db_max_connections(),
            db_acquire_timeout_secs: default_db_acquire_timeout(),
            port: default_port(),
            app_env: default_app_env(),
            hostname: None,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("PORT must be non-zero".to_string());
        }

        if self.db_host.trim().is_empty() {
            return Err("DB_HOST is required".to_string());
        }

        if self.db_user.trim().is_empty() {
            return Err("DB_USER is required".to_string());
        }

        if self.db_name.trim().is_empty() {
            return Err("DB_NAME is required".to_string());
        }

        if self.db_max_connections == 0 {
            return Err("DB_MAX_CONNECTIONS must be at least 1".to_string());
        }

        if self.db_acquire_timeout_secs == 0 {
            return Err("DB_ACQUIRE_TIMEOUT_SECS must be at least 1".to_string());
        }

        Ok(())
    }

    /// Connection options for the database pool.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.db_host)
            .port(self.db_port)
            .username(&self.db_user)
            .password(&self.db_password)
            .database(&self.db_name)
    }

    /// Pool acquire timeout.
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.db_acquire_timeout_secs)
    }

    /// Database location without credentials, for logs.
    pub fn db_display(&self) -> String {
        format!(
            "postgres://{}@{}:{}/{}",
            self.db_user, self.db_host, self.db_port, self.db_name
        )
    }
}
