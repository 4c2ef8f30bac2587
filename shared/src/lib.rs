//! Shared types and domain logic for the lot capture service
//!
//! This crate holds everything that does not need I/O: the catalog table
//! model, column normalization and joins, article lookup, record assembly,
//! input validation and per-session flow state. It is used by the backend
//! and, through WASM, by the browser form.

pub mod error;
pub mod lookup;
pub mod models;
pub mod record_builder;
pub mod session;
pub mod table;
pub mod types;
pub mod validation;

pub use error::*;
pub use lookup::*;
pub use models::*;
pub use record_builder::*;
pub use session::*;
pub use table::*;
pub use types::*;
pub use validation::*;
