//! Integration tests for the backend.
//!
//! Most tests run a real server on an ephemeral port. Tests marked
//! `#[ignore]` need a reachable PostgreSQL configured through the `DB_*`
//! environment variables.
//! Run with: cargo test --test integration -- --ignored

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::Value;
use tokio::net::TcpListener;

use scalable_app::api::{create_router, AppState};
use scalable_app::client::{StatusClient, CONNECT_ERROR_MESSAGE};
use scalable_app::config::Config;
use scalable_app::db::{Database, MockConfig, MockDatabase, PgDatabase};

/// Serve `db` on an ephemeral port and return the base URL.
async fn spawn_server(db: Arc<dyn Database>) -> String {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    let router = create_router(AppState::new(db, "integration-host"));

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{}", addr)
}

async fn get(base: &str, path: &str) -> (u16, Value) {
    let response = reqwest::get(format!("{}{}", base, path)).await.unwrap();
    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
}

/// Pool pointed at a port nothing listens on.
fn refused_database() -> PgDatabase {
    PgDatabase::connect_lazy(&Config {
        db_host: "127.0.0.1".to_string(),
        db_port: 1,
        db_acquire_timeout_secs: 1,
        ..Config::default()
    })
}

#[tokio::test]
async fn status_client_renders_connected_backend() {
    let base = spawn_server(Arc::new(MockDatabase::new())).await;

    let doc = StatusClient::new(&base).unwrap().fetch_status().await;

    assert_eq!(doc["message"], "Backend API is running!");
    assert_eq!(doc["hostname"], "integration-host");
    assert_eq!(doc["database"]["connected"], true);
    assert_eq!(doc["database"]["version"], "PostgreSQL 14.2");
}

#[tokio::test]
async fn status_client_reports_unreachable_backend() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let doc = StatusClient::new(format!("http://{}", addr))
        .unwrap()
        .fetch_status()
        .await;

    assert_eq!(doc["message"], CONNECT_ERROR_MESSAGE);
    assert!(doc["error"].is_string());
}

#[tokio::test]
async fn refused_database_is_reported_in_band() {
    let base = spawn_server(Arc::new(refused_database())).await;

    let (status, body) = get(&base, "/api").await;

    assert_eq!(status, 200);
    assert_eq!(body["database"]["connected"], false);
    let error = body["database"]["error"].as_str().unwrap();
    assert!(
        error.to_lowercase().contains("refused"),
        "error should carry the refusal reason: {error}"
    );
    assert!(body["database"].get("version").is_none());
}

#[tokio::test]
async fn health_survives_database_outage() {
    let base = spawn_server(Arc::new(refused_database())).await;

    let (status, body) = get(&base, "/health").await;

    assert_eq!(status, 200);
    assert_eq!(body["status"], "OK");
    let timestamp = body["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[tokio::test]
async fn data_endpoint_degrades_with_refused_database() {
    let base = spawn_server(Arc::new(refused_database())).await;

    let (status, body) = get(&base, "/api/data").await;

    assert_eq!(status, 200);
    assert!(body["database_error"].is_string());
    assert!(body.get("table_count").is_none());
    assert_eq!(body["data"], "Sample data for load testing");
}

#[tokio::test]
async fn concurrent_data_requests_are_independent() {
    let db = MockDatabase::with_config(MockConfig {
        latency_ms: 20,
        ..MockConfig::default()
    });
    let base = spawn_server(Arc::new(db.clone())).await;

    let requests = (0..16).map(|_| {
        let base = base.clone();
        tokio::spawn(async move { get(&base, "/api/data").await })
    });
    let responses = futures::future::join_all(requests).await;

    let mut randoms = HashSet::new();
    let mut counts = HashSet::new();
    for response in responses {
        let (status, body) = response.unwrap();
        assert_eq!(status, 200);

        let random = body["random"].as_f64().unwrap();
        assert!((0.0..1.0).contains(&random));
        randoms.insert(random.to_bits());
        counts.insert(body["table_count"].as_i64().unwrap());
    }

    assert_eq!(randoms.len(), 16);
    assert_eq!(counts.len(), 16);
    assert_eq!(db.calls(), 16);
}

/// Live database config from the environment.
fn live_config() -> Option<Config> {
    dotenvy::dotenv().ok();
    std::env::var("DB_HOST").ok()?;
    Config::load().ok()
}

#[tokio::test]
#[ignore = "requires a reachable PostgreSQL (DB_HOST etc.)"]
async fn live_database_reports_server_info() {
    let config = match live_config() {
        Some(c) => c,
        None => {
            println!("Skipping: DB_HOST not set");
            return;
        }
    };

    let db = PgDatabase::connect_lazy(&config);
    let info = db.server_info().await.unwrap();

    assert!(info.short_version().starts_with("PostgreSQL "));
    assert!(chrono::DateTime::parse_from_rfc3339(&info.current_time).is_ok());

    let count = db.table_count().await.unwrap();
    assert!(count > 0, "information_schema.tables is never empty");

    db.close().await;
}

#[tokio::test]
#[ignore = "requires a reachable PostgreSQL (DB_HOST etc.)"]
async fn live_database_end_to_end() {
    let config = match live_config() {
        Some(c) => c,
        None => {
            println!("Skipping: DB_HOST not set");
            return;
        }
    };

    let base = spawn_server(Arc::new(PgDatabase::connect_lazy(&config))).await;

    let (status, body) = get(&base, "/api").await;
    assert_eq!(status, 200);
    assert_eq!(body["database"]["connected"], true);
    assert!(body["database"].get("error").is_none());

    let (status, body) = get(&base, "/api/data").await;
    assert_eq!(status, 200);
    assert!(body["table_count"].is_i64());
    assert!(body.get("database_error").is_none());
}
