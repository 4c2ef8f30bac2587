//! Article lookup HTTP handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use shared::Selection;

use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    #[serde(default)]
    pub code: String,
}

/// Matching catalog rows and the lot options for an article code
pub async fn lookup_article(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> impl IntoResponse {
    // A blank code is rejected before the catalog is touched
    if query.code.trim().is_empty() {
        return AppError::EmptyCode.into_response();
    }

    let catalog = match state.catalog.get_or_load(&state.catalog_service).await {
        Ok(catalog) => catalog,
        Err(e) => return e.into_response(),
    };

    match Selection::lookup(&catalog, &query.code) {
        Ok(selection) => (StatusCode::OK, Json(selection)).into_response(),
        Err(e) => AppError::from(e).into_response(),
    }
}
