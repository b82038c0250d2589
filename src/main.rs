//! session-booking - Session booking backend with stateless bearer-token authentication
//!
//! This is the main entry point for the session-booking application.

use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing::{error, info};

use session_booking::auth::{CredentialsAuthenticator, PrincipalStore, TokenCodec};
use session_booking::config::Config;
use session_booking::database::SqliteDatabase;
use session_booking::otel::{init_tracing, Metrics, OtelProvider};
use session_booking::server::{AppState, Server};

/// session-booking - Session booking backend with stateless bearer-token authentication
#[derive(Parser, Debug)]
#[command(name = "session-booking")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env = "SESSION_BOOKING_CONFIG")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = load_config(&args)?;

    let otel_provider = OtelProvider::new(&config.otel)?;
    init_tracing(&otel_provider, &config.logging)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting session-booking"
    );

    if let Some(parent) = std::path::Path::new(&config.database.path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let database = Arc::new(SqliteDatabase::new(&config.database.path).await?);
    info!(path = %config.database.path, "Database initialized");

    let codec = Arc::new(TokenCodec::from_config(&config.auth));
    let authenticator = Arc::new(CredentialsAuthenticator::new(PrincipalStore::new(
        Arc::clone(&database),
    )));
    info!(
        token_validity_ms = config.auth.jwt_expiration_ms,
        "Token codec initialized"
    );

    let metrics = Arc::new(Metrics::new(&otel_provider.meter()));
    let state = AppState::new(database, codec, authenticator, metrics);

    let server = Server::new(config.server.clone(), state);

    info!(
        host = %config.server.host,
        port = %config.server.port,
        "Starting HTTP server"
    );

    let result = server.run(shutdown_signal()).await;

    if let Err(e) = otel_provider.shutdown() {
        error!(error = %e, "Failed to shutdown OpenTelemetry");
    }

    info!("session-booking shutdown complete");

    result.map_err(Into::into)
}

/// Load and validate configuration from file or environment
fn load_config(args: &Args) -> anyhow::Result<Config> {
    // tracing is not initialized yet
    let config = match &args.config {
        Some(path) => {
            eprintln!("Loading configuration from file: {}", path);
            Config::from_file(path)
        }
        None => {
            eprintln!("Loading configuration from environment variables");
            Config::from_env()
        }
    }
    .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid config: {}", e))?;

    Ok(config)
}

/// Create a future that resolves when a shutdown signal is received
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
