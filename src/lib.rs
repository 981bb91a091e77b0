//! Stateless HTTP backend for the scalable web application demo.
//!
//! Three routes make up the status-reporting contract:
//!
//! ```text
//! GET /health    {status:"OK", timestamp}                    no database
//! GET /api       {message, hostname, timestamp, database}    server time + version
//! GET /api/data  {data, timestamp, hostname, random, ...}    catalog row count
//! ```
//!
//! Database failures are reported inside the body; the HTTP status stays 200.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`db`]: Connection pool adapter and database probes
//! - [`api`]: HTTP handlers and router
//! - [`client`]: Presentation client for `/api`
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Timestamps, hostname, shutdown signal

pub mod api;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod metrics;
pub mod utils;

pub use config::Config;
pub use error::{AppError, DbError, Result};
