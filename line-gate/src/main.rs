//! LineGate Web Server - LINE webhook receiver.
//!
//! This binary:
//! - Receives LINE webhooks
//! - Checks the sender against the allowlist sheet
//! - Replies to permitted users and records an audit row

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use reqwest::Client;
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use linegate::web::{health, line_webhook, AppState};
use linegate::{Config, Gate};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("web_server_starting");

    // Load configuration
    let config = Config::from_env();
    info!(
        port = config.port,
        line_token_set = !config.line_channel_access_token.is_empty(),
        line_signature_configured = config.line_channel_secret.is_some(),
        spreadsheet_id_set = !config.spreadsheet_id.is_empty(),
        sheet_name = %config.sheet_name,
        request_timeout_ms = config.request_timeout_ms,
        "config_loaded"
    );

    // One HTTP client shared by the LINE and Sheets calls
    let client = Client::builder()
        .timeout(config.request_timeout())
        .build()
        .context("Failed to create HTTP client")?;

    let gate = Gate::from_config(&config, client);
    let state = AppState::new(config.clone(), gate);

    // Build the router
    let app = Router::new()
        .route("/health", get(health))
        .route("/", post(line_webhook))
        .route("/webhook", post(line_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "web_server_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("web_server_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
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
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("web_server_shutting_down");
}
