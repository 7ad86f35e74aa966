//! subsocket server entry point.
//!
//! Starts the Axum HTTP server with the admin API and the WebSocket
//! endpoint.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use subsocket::app_state::AppState;
use subsocket::config::{LogFormat, RelayConfig};
use subsocket::server::build_app;
use subsocket::service::{RelayService, StaticTokenVerifier};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = RelayConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().with_env_filter(filter).json().init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, "starting subsocket");

    // Build service layer
    let verifier = Arc::new(StaticTokenVerifier::new(config.admin_token.clone()));
    let app_state = AppState::new(RelayService::new(verifier));

    // Build router
    let app = build_app(app_state, config.static_dir.as_deref());

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
