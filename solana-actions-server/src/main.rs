//! Reference Solana Actions HTTP server.
//!
//! # Usage
//!
//! ```bash
//! # Run with default config (config.toml in current directory)
//! cargo run -p solana-actions-server --release
//!
//! # Run with custom config path
//! CONFIG=/path/to/config.toml cargo run -p solana-actions-server
//!
//! # Configure logging level
//! RUST_LOG=debug cargo run -p solana-actions-server
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` - Path to TOML configuration file (default: `config.toml`)
//! - `HOST` - Override bind address (default: `0.0.0.0`)
//! - `PORT` - Override port (default: `8080`)
//! - `ACTION_IDENTITY_SECRET` - Identity keypair as a JSON byte array
//! - `RUST_LOG` - Log level filter (default: `info`)

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use solana_actions_http::{ActionHeadersConfig, create_action_headers};
use solana_actions_server::config::ServerConfig;
use solana_actions_server::{AppState, action_router};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_commitment_config::CommitmentConfig;
use solana_signer::Signer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!("Server failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::load()?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        base_url = %config.base_url,
        chain_id = %config.chain_id,
        "Loaded configuration"
    );

    let ledger = Arc::new(RpcClient::new_with_commitment(
        config.rpc_url.clone(),
        CommitmentConfig::confirmed(),
    ));
    let headers = create_action_headers(
        ActionHeadersConfig::default()
            .with_chain_id(&config.chain_id)
            .with_action_version(&config.action_version),
    )?;

    let mut state = AppState::new(ledger, headers, &config.base_url)?
        .with_icon(config.icon_url())
        .with_compute_unit_limit(config.compute_unit_limit);
    match config.action_identity()? {
        Some(identity) => {
            tracing::info!(identity = %identity.pubkey(), "Action identity loaded");
            state = state.with_identity(identity);
        }
        None => tracing::warn!("No action identity configured, transactions will not be tagged"),
    }

    let app = action_router(Arc::new(state)).route("/health", axum::routing::get(health));

    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Actions server listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Actions server shut down gracefully");
    Ok(())
}

/// Health check endpoint.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Waits for Ctrl-C or SIGTERM (Unix) to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => tracing::info!("Received Ctrl-C, shutting down..."),
            _ = sigterm.recv() => tracing::info!("Received SIGTERM, shutting down..."),
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await.expect("failed to listen for Ctrl-C");
        tracing::info!("Received Ctrl-C, shutting down...");
    }
}
