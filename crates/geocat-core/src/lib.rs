//! geocat core - domain models and error taxonomy shared by every crate.

pub mod error;
pub mod models;

pub use error::{CatalogError, Result};
