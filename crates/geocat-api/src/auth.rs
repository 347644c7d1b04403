use axum::{extract::Request, extract::State, middleware::Next, response::Response};

use crate::error::ApiError;
use crate::state::AppState;

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Reject catalog requests lacking the configured API key. With no key
/// configured the API runs open (development mode); account management and
/// token issuance live outside this service.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(expected) = &state.api_key {
        let presented =
            request.headers().get(API_KEY_HEADER).and_then(|value| value.to_str().ok());
        if presented != Some(expected.as_str()) {
            return Err(ApiError::unauthorized("Missing or invalid API key"));
        }
    }
    Ok(next.run(request).await)
}
