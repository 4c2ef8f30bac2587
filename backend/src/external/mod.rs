//! External catalog sources

pub mod catalog_source;
pub mod workbook;

pub use catalog_source::CatalogSourceClient;
