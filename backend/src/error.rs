//! Error handling for the lot capture service
//!
//! Provides consistent error responses in English and Spanish

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{CatalogError, EntryError, LookupError, ValidationError};
use thiserror::Error;
use uuid::Uuid;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Catalog source errors
    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Parse error: {0}")]
    Parse(String),

    // Operator input errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Validation error: {message}")]
    InvalidRequest { field: String, message: String },

    #[error("No search performed: empty article code")]
    EmptyCode,

    #[error("Article not found: {0}")]
    NotFound(String),

    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    // Output errors
    #[error("Export error: {0}")]
    Export(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        AppError::Parse(err.to_string())
    }
}

impl From<LookupError> for AppError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::EmptyCode => AppError::EmptyCode,
            LookupError::NotFound(code) => AppError::NotFound(code),
        }
    }
}

impl From<EntryError> for AppError {
    fn from(err: EntryError) -> Self {
        match err {
            EntryError::Lookup(e) => e.into(),
            EntryError::Validation(e) => e.into(),
        }
    }
}

impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        AppError::Export(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field = errors
            .field_errors()
            .keys()
            .next()
            .map(|f| f.to_string())
            .unwrap_or_default();
        AppError::InvalidRequest {
            field,
            message: errors.to_string(),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_es: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

fn validation_message_es(err: &ValidationError) -> String {
    match err {
        ValidationError::MissingLot => "Debe ingresar un número de lote válido.".to_string(),
        ValidationError::NoValidLot => {
            "No hay un lote válido para este artículo.".to_string()
        }
        ValidationError::MissingColumns(fields) => format!(
            "Faltan columnas en la base de datos: {}",
            fields
                .iter()
                .map(|f| f.name())
                .collect::<Vec<_>>()
                .join(", ")
        ),
        ValidationError::MissingQuantity => "Debe ingresar la cantidad.".to_string(),
        ValidationError::InvalidQuantity(value) => {
            format!("La cantidad no es válida: {}", value)
        }
        ValidationError::NoEntries => "No hay entradas guardadas.".to_string(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::Fetch(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code: "FETCH_ERROR".to_string(),
                    message_en: format!("Could not load the catalog: {}", msg),
                    message_es: format!("Error al cargar la base de datos: {}", msg),
                    field: None,
                },
            ),
            AppError::Parse(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code: "PARSE_ERROR".to_string(),
                    message_en: format!("The catalog source returned unexpected data: {}", msg),
                    message_es: format!("La base de datos tiene un formato inesperado: {}", msg),
                    field: None,
                },
            ),
            AppError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: err.to_string(),
                    message_es: validation_message_es(err),
                    field: err.field().map(str::to_string),
                },
            ),
            AppError::InvalidRequest { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: message.clone(),
                    message_es: format!("Datos no válidos: {}", message),
                    field: Some(field.clone()),
                },
            ),
            AppError::EmptyCode => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "EMPTY_CODE".to_string(),
                    message_en: "Enter an article code".to_string(),
                    message_es: "Ingrese el código del artículo.".to_string(),
                    field: Some("code".to_string()),
                },
            ),
            AppError::NotFound(code) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message_en: format!("Article code {} not found in the catalog", code),
                    message_es: format!(
                        "Código de artículo {} no encontrado en la base de datos.",
                        code
                    ),
                    field: Some("code".to_string()),
                },
            ),
            AppError::SessionNotFound(id) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "SESSION_NOT_FOUND".to_string(),
                    message_en: format!("Session {} not found", id),
                    message_es: format!("No se encontró la sesión {}", id),
                    field: None,
                },
            ),
            AppError::Export(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "EXPORT_ERROR".to_string(),
                    message_en: format!("Could not build the spreadsheet: {}", msg),
                    message_es: format!("No se pudo generar el archivo Excel: {}", msg),
                    field: None,
                },
            ),
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "CONFIGURATION_ERROR".to_string(),
                    message_en: format!("Configuration error: {}", msg),
                    message_es: format!("Error de configuración: {}", msg),
                    field: None,
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_es: "Error interno del servidor".to_string(),
                    field: None,
                },
            ),
        };

        // Log the error for debugging
        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Rejected request: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
