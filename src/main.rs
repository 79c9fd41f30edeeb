//! Conversion Insights Backend - Main Entry Point
//!
//! Loads model artifacts, builds the fixture tables, and serves the
//! analytics and prediction API over HTTP.

use anyhow::{Context, Result};
use conversion_insights::{
    config::AppConfig, fixtures::ChartFixtures, models::loader::ModelLoader, server,
    server::AppState,
};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("conversion_insights=info".parse()?),
        )
        .init();

    info!("Starting Conversion Insights Backend");

    // Load configuration
    let mut config = AppConfig::load()?;
    if let Ok(port) = std::env::var("PORT") {
        config.server.port = port
            .parse()
            .context("PORT environment variable must be a port number")?;
    }
    info!("Configuration loaded successfully");

    // Populate the model registry from artifact files; missing models
    // leave the scorer on its fallback formula.
    let loader = ModelLoader::with_threads(config.models.onnx_threads);
    let registry = Arc::new(loader.load_registry(
        Path::new(&config.models.models_dir),
        Path::new(&config.models.scalers_dir),
    ));
    info!(
        loaded = registry.len(),
        models = ?registry.loaded_ids(),
        "model registry ready"
    );

    // Fixture tables for the read-only analytics endpoints
    let fixtures = ChartFixtures::load()?;

    let state = AppState::new(&config, registry, fixtures);
    let addr = config.server.bind_addr();

    info!("Backend API: http://{addr}/api");
    info!("Health check: http://{addr}/api/health");
    info!("Predict endpoint: http://{addr}/api/predict");
    info!("Dataset preview: http://{addr}/api/dataset/preview");

    server::start(state, &addr).await
}
