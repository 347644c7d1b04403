//! Error types for geocat

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    // Request validation errors, raised before any backend round-trip
    #[error("Invalid polygon value: {value}")]
    InvalidPolygon { value: String },

    #[error("Maximum page size is {max}.")]
    PageSizeTooLarge { requested: usize, max: usize },

    #[error("Search backend does not allow page_size + offset to be > {limit}")]
    ResultWindowTooLarge {
        page_size: usize,
        offset: usize,
        limit: usize,
    },

    // Overlap reference lookups
    #[error("Failed to find dataset ID: {id}")]
    DatasetNotFound { id: String },

    // Search backend failures
    #[error("Search backend error: {message}")]
    Backend { message: String },

    #[error("Malformed search backend response: {reason}")]
    InvalidResponse { reason: String },
}

impl CatalogError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend { message: message.into() }
    }

    pub fn invalid_response(reason: impl Into<String>) -> Self {
        Self::InvalidResponse { reason: reason.into() }
    }

    /// True when the failure was caused by request input rather than by
    /// query execution. Transport layers map these to a 400-class status.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidPolygon { .. }
                | Self::PageSizeTooLarge { .. }
                | Self::ResultWindowTooLarge { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
