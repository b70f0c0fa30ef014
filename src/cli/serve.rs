//! Serve command - runs the HTTP command server

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::{error, info};

use crate::api::create_router;
use crate::config::AppConfig;
use crate::infrastructure::observability::init_metrics;

/// Run the command server
///
/// The first pipeline build runs in the background; until it succeeds the
/// server answers not-ready and `/ready` reports 503.
pub async fn run() -> anyhow::Result<()> {
    let config = super::bootstrap()?;

    let metrics = init_metrics(&config.metrics);
    let state = crate::create_app_state(&config, metrics)?;

    let bot = state.bot.clone();
    tokio::spawn(async move {
        if let Err(e) = bot.initialize().await {
            error!(error = %e, "Initial pipeline build failed; use the refresh command to retry");
        }
    });

    let app = create_router(state, &config.metrics.path);

    let addr = build_socket_addr(&config)?;
    info!("Starting command server on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

fn build_socket_addr(config: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    )))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_socket_addr() {
        let addr = build_socket_addr(&AppConfig::default()).unwrap();

        assert_eq!(addr.to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn test_invalid_host_rejected() {
        let mut config = AppConfig::default();
        config.server.host = "not-an-ip".to_string();

        assert!(build_socket_addr(&config).is_err());
    }
}
