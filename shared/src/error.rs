//! Domain errors for catalog parsing, lookup and record capture

use thiserror::Error;

use crate::models::Field;

/// A remote payload did not have the expected tabular shape
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("missing column: {0}")]
    MissingColumn(String),

    #[error("sheet not found: {0}")]
    SheetNotFound(String),

    #[error("workbook has no sheets")]
    NoSheets,

    #[error("sheet {0} has no header row")]
    EmptySheet(String),

    #[error("unreadable workbook: {0}")]
    UnreadableWorkbook(String),

    #[error("unexpected payload: {0}")]
    UnexpectedShape(String),
}

/// User input that cannot be turned into a record
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("missing lot")]
    MissingLot,

    #[error("no valid lot")]
    NoValidLot,

    #[error("missing columns: {}", join_fields(.0))]
    MissingColumns(Vec<Field>),

    #[error("missing quantity")]
    MissingQuantity,

    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("no saved entries")]
    NoEntries,
}

impl ValidationError {
    /// Form field the error refers to, when there is one
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::MissingLot | ValidationError::NoValidLot => Some("lot"),
            ValidationError::MissingQuantity | ValidationError::InvalidQuantity(_) => {
                Some("quantity")
            }
            ValidationError::MissingColumns(_) | ValidationError::NoEntries => None,
        }
    }
}

fn join_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(Field::name)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("no search performed: empty article code")]
    EmptyCode,

    #[error("article code not found: {0}")]
    NotFound(String),
}

/// Failure of the add-entry flow
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EntryError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
