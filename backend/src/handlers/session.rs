//! Capture session HTTP handlers

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use shared::{EntryRequest, OutputRecord, QuantityInput, ScanOutcome, Selection};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::services::EXPORT_MIME;
use crate::AppState;

/// Input for setting the typed article code
#[derive(Debug, Deserialize, Validate)]
pub struct SetCodeRequest {
    #[validate(length(max = 64))]
    pub code: String,
}

/// Input for a decoded barcode value
#[derive(Debug, Deserialize, Validate)]
pub struct ScanRequest {
    #[validate(length(min = 1, max = 256))]
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub outcome: ScanOutcome,
    pub active_code: Option<String>,
    /// Lookup for the new code when the scan replaced it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<Selection>,
}

/// Input for saving one entry
#[derive(Debug, Deserialize, Validate)]
pub struct AddEntryRequest {
    #[validate(length(max = 64))]
    pub code: Option<String>,
    #[serde(default)]
    #[validate(length(max = 64))]
    pub chosen_lot: String,
    #[validate(length(max = 64))]
    pub new_lot: Option<String>,
    pub quantity: Option<QuantityInput>,
}

impl From<AddEntryRequest> for EntryRequest {
    fn from(input: AddEntryRequest) -> Self {
        EntryRequest {
            code: input.code,
            chosen_lot: input.chosen_lot,
            new_lot: input.new_lot,
            quantity: input.quantity,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AddEntryResponse {
    pub entry: OutputRecord,
    pub total_entries: usize,
}

/// Start a new capture session
pub async fn create_session(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.sessions.create().await;
    (StatusCode::CREATED, Json(session))
}

/// Current code and saved entries of a session
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.sessions.get(session_id).await {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Discard a session
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.sessions.remove(session_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Set the article code typed by the operator
pub async fn set_code(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(input): Json<SetCodeRequest>,
) -> impl IntoResponse {
    if let Err(e) = input.validate() {
        return AppError::from(e).into_response();
    }

    match state.sessions.set_code(session_id, &input.code).await {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Accept a value decoded by the browser's barcode reader
pub async fn scan_code(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(input): Json<ScanRequest>,
) -> impl IntoResponse {
    if let Err(e) = input.validate() {
        return AppError::from(e).into_response();
    }

    let (outcome, active_code) = match state.sessions.accept_scan(session_id, &input.value).await
    {
        Ok(result) => result,
        Err(e) => return e.into_response(),
    };

    // With auto-fill on the scan is the active code and goes through the
    // lookup as if typed; a repeated value re-runs the same search
    let selection = match (&outcome, active_code.as_deref()) {
        (ScanOutcome::CodeUpdated(_) | ScanOutcome::Unchanged(_), Some(code))
            if state.config.flow.auto_fill_from_scan =>
        {
            let catalog = match state.catalog.get_or_load(&state.catalog_service).await {
                Ok(catalog) => catalog,
                Err(e) => return e.into_response(),
            };
            match Selection::lookup(&catalog, code) {
                Ok(selection) => Some(selection),
                Err(e) => return AppError::from(e).into_response(),
            }
        }
        _ => None,
    };

    (
        StatusCode::OK,
        Json(ScanResponse {
            outcome,
            active_code,
            selection,
        }),
    )
        .into_response()
}

/// Validate the form and save one entry
pub async fn add_entry(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(input): Json<AddEntryRequest>,
) -> impl IntoResponse {
    if let Err(e) = input.validate() {
        return AppError::from(e).into_response();
    }

    let catalog = match state.catalog.get_or_load(&state.catalog_service).await {
        Ok(catalog) => catalog,
        Err(e) => return e.into_response(),
    };

    let request = EntryRequest::from(input);
    match state.sessions.add_entry(session_id, &catalog, &request).await {
        Ok((entry, total_entries)) => (
            StatusCode::CREATED,
            Json(AddEntryResponse {
                entry,
                total_entries,
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Start a new batch: drop saved entries and the last scan
pub async fn clear_entries(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.sessions.clear(session_id).await {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Download the saved entries as a workbook
pub async fn export_entries(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> impl IntoResponse {
    let sheet_name = state.config.flow.sheet_name.as_str();
    match state.sessions.export(session_id, sheet_name).await {
        Ok(file) => {
            tracing::info!(
                session_id = %session_id,
                records = file.records,
                file_name = file.file_name,
                "Exported entries"
            );
            let disposition = format!("attachment; filename=\"{}\"", file.file_name);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, EXPORT_MIME.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                file.bytes,
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}
