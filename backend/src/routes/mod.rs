//! Route definitions for the lot capture service

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/catalog", catalog_routes())
        .route("/lookup", get(handlers::lookup_article))
        .nest("/sessions", session_routes())
}

/// Catalog cache routes
fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_catalog_status))
        .route("/refresh", post(handlers::refresh_catalog))
}

/// Capture session routes
fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_session))
        .route(
            "/:session_id",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/:session_id/code", put(handlers::set_code))
        .route("/:session_id/scan", post(handlers::scan_code))
        .route(
            "/:session_id/entries",
            post(handlers::add_entry).delete(handlers::clear_entries),
        )
        .route("/:session_id/export", get(handlers::export_entries))
}
