//! Search backend adapters for the geocat catalog.
//!
//! The catalog core only ever talks to the backend through the
//! [`ports::SearchBackend`] trait. `es` is the production Elasticsearch
//! adapter; `memory` is an in-process double that interprets the same query
//! DSL for development and tests.

pub mod es;
pub mod memory;
pub mod ports;

pub use es::{EsBackend, EsConfig};
pub use memory::MemoryBackend;
pub use ports::SearchBackend;
