//! Domain models for the lot capture flow

mod catalog;
mod record;

pub use catalog::*;
pub use record::*;
