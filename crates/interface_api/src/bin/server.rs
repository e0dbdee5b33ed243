//! Exchange Back Office - API Server Binary
//!
//! This binary starts the HTTP API server for the back office.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin backoffice-api
//!
//! # Run with environment variables
//! BACKOFFICE_PORT=9090 BACKOFFICE_PRICES="BTC=3100000000,ETH=160000000" cargo run --bin backoffice-api
//! ```
//!
//! # Environment Variables
//!
//! * `BACKOFFICE_HOST` - Server host (default: 0.0.0.0)
//! * `BACKOFFICE_PORT` - Server port (default: 8080)
//! * `BACKOFFICE_JWT_SECRET` - JWT signing secret (required in production)
//! * `BACKOFFICE_JWT_EXPIRATION_SECS` - JWT token expiration in seconds (default: 3600)
//! * `BACKOFFICE_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `BACKOFFICE_PRICE_TIMEOUT_MS` - Price feed call bound (default: 3000)
//! * `BACKOFFICE_MIN_ORDER_VALUE_TMN` - Smallest accepted order total (default: 0)
//! * `BACKOFFICE_PRICES` - Static quote table, `SYMBOL=PRICE` pairs

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use interface_api::{config::ApiConfig, create_router, service::BackOffice};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Main entry point for the API server.
///
/// Initializes logging, loads configuration, wires the back office and
/// starts the HTTP server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("loading configuration")?;

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Starting exchange back office API server"
    );

    let service = BackOffice::from_config(&config).context("wiring back office")?;
    let app = create_router(Arc::new(service), config.clone());

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid server address {}", config.server_addr()))?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
