use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use geocat_core::error::CatalogError;

use crate::dto::ErrorEnvelope;

/// Unified API error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into() }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self { status: StatusCode::UNAUTHORIZED, message: message.into() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self { status: StatusCode::NOT_FOUND, message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, message: message.into() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorEnvelope { success: false, message: self.message };
        (self.status, Json(body)).into_response()
    }
}

/// Status mapping for core failures: validation errors are the caller's
/// fault, a missing overlap reference is 404, everything else is an
/// execution failure.
impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match &err {
            CatalogError::DatasetNotFound { .. } => Self::not_found(err.to_string()),
            _ if err.is_validation() => Self::bad_request(err.to_string()),
            _ => {
                tracing::error!(error = %err, "catalog query failed");
                Self::internal(err.to_string())
            }
        }
    }
}
