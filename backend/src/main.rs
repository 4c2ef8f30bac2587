//! Lot Capture Service - Backend Server
//!
//! Article and lot lookup against the warehouse inventory, with spreadsheet
//! export of the captured entries.

use std::net::SocketAddr;

use lot_capture_backend::{create_app, AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lotcap_server=debug,lot_capture_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Lot Capture Server");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("Catalog source: {}", config.catalog.source);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    // Create application state
    let state = AppState::new(config)?;

    // Warm the catalog cache; requests retry the load if this fails
    match state.catalog.get_or_load(&state.catalog_service).await {
        Ok(catalog) => tracing::info!("Catalog ready with {} rows", catalog.len()),
        Err(e) => tracing::warn!("Catalog not loaded at startup: {}", e),
    }

    // Build application
    let app = create_app(state);

    // Start server
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
