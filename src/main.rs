use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use leads_api::api;
use leads_api::config::Config;
use leads_api::db::repository_from_config;
use leads_api::handlers::AppState;
use leads_api::services::LeadService;

/// Main entry point for the application.
///
/// Initializes logging, loads configuration, selects the lead store, then
/// serves the HTTP API until Ctrl-C.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.default_log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
    config.log_summary();

    let repository = repository_from_config(&config).await?;
    let app_state = Arc::new(AppState::new(LeadService::new(repository), config.clone()));
    let app = api::router(app_state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
