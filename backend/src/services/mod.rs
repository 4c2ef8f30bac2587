//! Business logic services for the lot capture service

pub mod catalog;
pub mod export;
pub mod session;

pub use catalog::{load_catalog, CatalogCache, CatalogService, CatalogStatus};
pub use export::{to_spreadsheet_bytes, DEFAULT_SHEET_NAME, EXPORT_MIME};
pub use session::{ExportFile, SessionStore, SessionView};
