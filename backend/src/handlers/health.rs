//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub catalog: String,
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    // Reports the cache only; never triggers a remote fetch
    let status = state.catalog.status(&state.catalog_service).await;
    let catalog = if status.loaded {
        format!("loaded ({} rows)", status.rows)
    } else {
        "not_loaded".to_string()
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        catalog,
    })
}
