//! Serve command - runs the HTTP server

use std::net::SocketAddr;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

use crate::api::router::create_router_with_state;
use crate::api::state::AppState;
use crate::config::AppConfig;
use crate::infrastructure::logging;
use crate::infrastructure::observability::{create_metrics_router, init_metrics, PrometheusMetrics};
use crate::infrastructure::storage::StorageType;

/// Run the gateway server
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_logging(&config);
    warn_if_in_memory(&config);

    let state = crate::create_app_state(&config).await?;
    let metrics = init_metrics(&config.metrics);
    let app = create_app(state, &config, metrics);

    let addr = build_socket_addr(&config)?;
    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

pub(crate) fn init_logging(config: &AppConfig) {
    logging::init_logging(&logging::LoggingConfig {
        level: config.logging.level.clone(),
        format: config.logging.format.clone(),
    });
}

/// Returns true when the server runs on process-local storage
fn warn_if_in_memory(config: &AppConfig) -> bool {
    let in_memory = StorageType::from_str(&config.storage.backend) == Some(StorageType::InMemory);

    if in_memory {
        warn!(
            "storage.backend is \"memory\": this instance is single-node, starts with no API keys \
             and rejects every request until it is pointed at the shared redis store"
        );
    }

    in_memory
}

fn create_app(state: AppState, config: &AppConfig, metrics: Option<PrometheusMetrics>) -> Router {
    let router = create_router_with_state(state, config.server.request_timeout());

    match metrics {
        Some(m) => router.merge(create_metrics_router(m, &config.metrics.path)),
        None => router,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
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
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
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

fn build_socket_addr(config: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    )))
}
