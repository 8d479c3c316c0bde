//! Slotbook HTTP server.
//!
//! Run with: `cargo run --bin server`
//!
//! Reads configuration from the environment (and `.env`), connects to
//! `PostgreSQL` with retry, applies migrations and serves the API until
//! Ctrl+C or SIGTERM.

use anyhow::Context;
use slotbook_app::retry::retry_with_backoff;
use slotbook_app::server::DatabaseProbe;
use slotbook_app::{AppState, Config, build_router, metrics};
use slotbook_core::SystemClock;
use slotbook_postgres::{PgBookingLedger, PgEventDirectory};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,slotbook=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(http = %config.http_addr(), metrics = %config.metrics_addr(), "Starting Slotbook server");

    let metrics_addr = config
        .metrics_addr()
        .parse()
        .context("Invalid metrics address")?;
    metrics::install_prometheus(metrics_addr).context("Failed to install Prometheus exporter")?;

    let retry = config.retry_policy();
    let pool = retry_with_backoff(&retry, || {
        PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .min_connections(config.database.min_connections)
            .acquire_timeout(Duration::from_secs(config.database.connect_timeout))
            .connect(&config.database.url)
    })
    .await
    .context("Failed to connect to PostgreSQL")?;
    info!("Connected to PostgreSQL");

    slotbook_postgres::migrate(&pool)
        .await
        .context("Failed to run migrations")?;
    info!("Migrations applied");

    let state = AppState::new(
        Arc::new(PgBookingLedger::new(pool.clone())),
        Arc::new(PgEventDirectory::new(pool.clone())),
        Arc::new(SystemClock),
    )
    .with_read_retry(retry)
    .with_probe(Arc::new(DatabaseProbe(pool.clone())));

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.http_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.http_addr()))?;
    info!(addr = %config.http_addr(), "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    pool.close().await;
    info!("Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
///
/// A signal handler that cannot be installed is logged and never fires,
/// leaving the other one in charge.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C signal"),
        () = terminate => info!("Received SIGTERM signal"),
    }
}
