use anyhow::Context;
use clap::Parser;
use snapchart_api::config::Config;
use snapchart_api::middleware::observability::init_observability;
use snapchart_api::routes::{AppState, create_app};
use tracing::{error, info};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_observability(config.log_format)?;
    info!("Application starting...");

    let addr = config.listen_addr();
    let app_state = AppState::init(config).await?;
    let app = create_app(app_state.clone());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind listener to {}", addr))?;
    info!("Server listening on {}", addr);
    info!("Health check available at http://{}/health", addr);

    // Handle both SIGINT (Ctrl+C) and SIGTERM (Docker stop)
    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    app_state.shutdown().await;
    if let Err(e) = &result {
        error!("Server error: {}", e);
    }
    info!("Server shutdown complete");

    result.context("Server terminated with an error")
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to install SIGTERM handler: {}", e);
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for SIGINT: {}", e);
            }
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("SIGINT received, shutting down gracefully");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received, shutting down gracefully");
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
