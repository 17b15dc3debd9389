//! pod-tracker server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use pod_tracker::api;
use pod_tracker::app_state::AppState;
use pod_tracker::config::{LogFormat, TrackerConfig};
use pod_tracker::domain::{EventBus, PodRegistry};
use pod_tracker::persistence::{MemoryStore, PodStore, PostgresPersistence};
use pod_tracker::service::{LogLimits, PodService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = TrackerConfig::from_env()?;
    init_tracing(config.log_format);
    tracing::info!(addr = %config.listen_addr, "starting pod-tracker");

    // Select the authoritative store
    let store: Arc<dyn PodStore> = if config.persistence_enabled {
        let postgres = PostgresPersistence::connect(&config)
            .await
            .context("connecting to PostgreSQL")?;
        postgres.migrate().await.context("running migrations")?;
        tracing::info!("using PostgreSQL store");
        Arc::new(postgres)
    } else {
        tracing::warn!("persistence disabled, using in-memory store");
        Arc::new(MemoryStore::new())
    };

    // Build domain and service layers
    let registry = Arc::new(PodRegistry::new());
    let event_bus = EventBus::new(config.event_bus_capacity);
    let limits = LogLimits {
        max_entries: config.log_retention_max_entries,
        fetch_page_size: config.log_fetch_page_size,
    };
    let pod_service = Arc::new(PodService::new(registry, store, event_bus, limits));
    pod_service
        .restore_pods()
        .await
        .context("restoring pods from store")?;

    // Build router
    let app = api::build_app(AppState::new(pod_service), &config);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
