//! Lot Capture Service
//!
//! Looks up articles in a remote inventory catalog, lets an operator pick or
//! type a lot number, and exports the captured entries as a spreadsheet.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod routes;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};

use services::{CatalogCache, CatalogService, SessionStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog_service: Arc<CatalogService>,
    pub catalog: Arc<CatalogCache>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(config: Config) -> AppResult<Self> {
        let catalog_service = CatalogService::new(config.catalog.clone())?;
        let sessions = SessionStore::new(config.flow.options());
        Ok(Self {
            config: Arc::new(config),
            catalog_service: Arc::new(catalog_service),
            catalog: Arc::new(CatalogCache::new()),
            sessions: Arc::new(sessions),
        })
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Lot Capture Service API v1.0"
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
