//! Catalog status HTTP handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::AppState;

/// Summary of the cached catalog
pub async fn get_catalog_status(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.catalog.status(&state.catalog_service).await;
    (StatusCode::OK, Json(status))
}

/// Drop the cached catalog and fetch it again from the source
pub async fn refresh_catalog(State(state): State<AppState>) -> impl IntoResponse {
    match state.catalog.refresh(&state.catalog_service).await {
        Ok(_) => {
            let status = state.catalog.status(&state.catalog_service).await;
            (StatusCode::OK, Json(status)).into_response()
        }
        Err(e) => e.into_response(),
    }
}
