//! HTTP handlers for the lot capture service

pub mod catalog;
pub mod health;
pub mod lookup;
pub mod session;

pub use catalog::*;
pub use health::*;
pub use lookup::*;
pub use session::*;
