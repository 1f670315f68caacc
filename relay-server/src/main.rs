//! line-relay web server - multi-tenant LINE webhook relay.
//!
//! This binary provides a thin web server that:
//! - Receives LINE webhooks per account and verifies signatures
//! - Dispatches events and replies through the account's channel
//! - Exposes outbound send and quota/delivery passthrough reads

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use linerelay::web::{
    delivery_push, health, line_webhook, quota_consumption, quota_usage, send_message, AppState,
};
use linerelay::{AccountRegistry, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up a local .env before reading configuration
    dotenvy::dotenv().ok();

    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("relay_starting");

    // Load configuration
    let config = Config::from_env();
    info!(
        port = config.port,
        accounts = config.accounts.len(),
        api_base = %config.api_base,
        "config_loaded"
    );

    // Build the read-only account registry
    let registry = AccountRegistry::from_config(&config);
    anyhow::ensure!(
        !registry.is_empty(),
        "no accounts configured; set LINE_ACCOUNTS or LINE_CHANNEL_SECRET/LINE_CHANNEL_ACCESS_TOKEN"
    );
    info!(accounts = registry.len(), "registry_built");

    let state = AppState::new(registry);

    // Build the router
    let app = Router::new()
        .route("/health", get(health))
        .route("/:account/webhook", post(line_webhook))
        .route("/:account/line/sendmsg", post(send_message))
        .route("/:account/line/quota_usage", get(quota_usage))
        .route("/:account/line/quota_consumption", get(quota_consumption))
        .route("/:account/line/delivery_push", get(delivery_push))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "relay_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("relay_shutdown_complete");

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

    info!("relay_shutting_down");
}
