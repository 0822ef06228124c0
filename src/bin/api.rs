//! Chain TVL API Server
//!
//! Run with: cargo run --bin chaintvl-api
//!
//! # Configuration
//!
//! Read from `config.toml` in the default locations (see
//! `chaintvl-cli config`), overridden by environment variables:
//! - `CHAINTVL_API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `CHAINTVL_API_PORT`: Port to listen on (default: 8090)
//! - `CHAINTVL_REVALIDATE_SECS`: Page cache lifetime (default: 300)
//! - `CHAINTVL_LOG_FORMAT`: `pretty` or `json`
//! - `RUST_LOG`: Log filter (default: chaintvl=info,tower_http=debug)

use chaintvl::api::{serve, ApiConfig, AppState};
use chaintvl::config::{Config, LoggingConfig};
use chaintvl::sources::HttpDataSource;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_default();
    init_tracing(&config.logging);

    tracing::info!("Starting Chain TVL API server v{}", env!("CARGO_PKG_VERSION"));

    let api_config = ApiConfig {
        host: config.api.host.clone(),
        port: config.api.port,
        cors_origins: config.api.cors_origins.clone(),
        revalidate_secs: config.api.revalidate_secs,
        csv_filename: config.dashboard.csv_filename.clone(),
    };

    tracing::info!("Protocols: {}", config.sources.protocols_url);
    tracing::info!("Revalidate window: {:?}", api_config.revalidate_window());

    let source = Arc::new(HttpDataSource::new(config.sources.to_source_config())?);
    let state = AppState::new(source, config.dashboard.page_settings(), api_config.clone());

    // Warm the cache so the first request does not wait on every upstream
    match state.page().await {
        Ok(page) => tracing::info!("Initial page built: {} chains", page.chains.len()),
        Err(e) => tracing::warn!("Initial page build failed: {} (will retry on request)", e),
    }

    serve(state, &api_config).await?;

    tracing::info!("Chain TVL API server stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("chaintvl={},tower_http=debug", logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
