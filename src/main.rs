//! Scalable web application backend entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use scalable_app::api::{create_router, AppState};
use scalable_app::client::{render, StatusClient};
use scalable_app::config::Config;
use scalable_app::db::{Database, PgDatabase};
use scalable_app::metrics;
use scalable_app::utils::{resolve_hostname, shutdown_signal};

/// Stateless backend reporting liveness and database connectivity.
#[derive(Parser, Debug)]
#[command(name = "scalable-app")]
#[command(about = "HTTP backend with health, status and sample data endpoints")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP listen port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// HTTP listen port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Run both database probes once.
    CheckDb,

    /// Fetch and display `/api` from a running backend.
    Probe {
        /// Backend base URL.
        #[arg(long, env = "BACKEND_URL", default_value = "http://localhost:3000")]
        url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("scalable_app=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    if args.json_logs {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    // Handle subcommands
    match args.command {
        Some(Command::Serve { port }) => cmd_serve(port.or(args.port)).await,
        Some(Command::CheckConfig) => cmd_check_config(),
        Some(Command::CheckDb) => cmd_check_db().await,
        Some(Command::Probe { url }) => cmd_probe(&url).await,
        None => cmd_serve(args.port).await,
    }
}

/// Load and validate configuration, logging failures.
fn load_config() -> anyhow::Result<Config> {
    let config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    Ok(config)
}

/// Run the HTTP server until a shutdown signal arrives.
async fn cmd_serve(port_override: Option<u16>) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let mut config = load_config()?;

    // Override with CLI args if provided
    if let Some(port) = port_override {
        config.port = port;
    }

    let prometheus = match metrics::install() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Metrics recorder not installed: {}", e);
            None
        }
    };

    // One pool for the whole process
    let database = PgDatabase::connect_lazy(&config);
    let hostname = resolve_hostname(config.hostname.as_deref());

    let mut app_state = AppState::new(Arc::new(database.clone()), hostname.as_str());
    if let Some(handle) = prometheus {
        app_state = app_state.with_metrics(handle);
    }

    // Start HTTP server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("Backend server running on port {}", config.port);
    info!("Environment: {}", config.app_env);
    info!("Instance: {}", hostname);

    let router = create_router(app_state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    database.close().await;
    info!("Server stopped");

    Ok(())
}

/// Check configuration validity.
fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("SCALABLE APP - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Database: {}", config.db_display());
    println!("  Password: {}", "*".repeat(config.db_password.len().min(8)));
    println!("  Pool Size: {}", config.db_max_connections);
    println!("  Acquire Timeout: {}s", config.db_acquire_timeout_secs);
    println!("  Listen Port: {}", config.port);
    println!("  Environment: {}", config.app_env);
    println!(
        "  Hostname: {}",
        resolve_hostname(config.hostname.as_deref())
    );
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Run both database probes once and print the outcome.
async fn cmd_check_db() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("SCALABLE APP - DATABASE CHECK");
    println!("======================================================================");

    let config = load_config()?;
    let database = PgDatabase::connect_lazy(&config);
    println!("Database: {}", config.db_display());

    print!("Server info... ");
    let server_info = database.server_info().await;
    match &server_info {
        Ok(info) => {
            println!("OK");
            println!("  Current Time: {}", info.current_time);
            println!("  Version: {}", info.short_version());
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
        }
    }

    print!("Table count... ");
    let table_count = database.table_count().await;
    match &table_count {
        Ok(count) => {
            println!("OK");
            println!("  Tables: {}", count);
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
        }
    }

    database.close().await;
    println!("======================================================================");

    server_info?;
    table_count?;
    println!("DATABASE CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Fetch `/api` once and print it.
async fn cmd_probe(url: &str) -> anyhow::Result<()> {
    let client = StatusClient::new(url)?;
    println!("Attempting to connect to backend at: {}/api", client.base_url());

    let document = client.fetch_status().await;
    println!("{}", render(&document));

    Ok(())
}
