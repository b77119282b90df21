pub mod activations;
pub mod locations;
pub mod measures;
pub mod properties;

use lambda_http::{Body, Request, RequestExt, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::error;

use crate::auth::validate_bearer_token;
use crate::error::{ApiError, ValidationError};
use crate::state::AppState;

/// Enforce bearer authentication unless it is switched off
pub fn authorize(event: &Request, state: &AppState) -> Result<(), ApiError> {
    if !state.config.jwt_authentication_enabled {
        return Ok(());
    }

    validate_bearer_token(event, state.clock.as_ref())?;
    Ok(())
}

/// A trimmed, non-empty query string parameter
pub fn query_param(event: &Request, name: &str) -> Option<String> {
    event
        .query_string_parameters()
        .first(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Deserialize a JSON request body
pub fn parse_json_body<T: DeserializeOwned>(
    event: &Request,
    request_id: &str,
) -> Result<T, ApiError> {
    let body_bytes = match event.body() {
        Body::Text(text) => text.as_bytes(),
        Body::Binary(bytes) => bytes.as_slice(),
        Body::Empty => {
            return Err(ValidationError::InvalidBody("Request body is empty".to_string()).into());
        }
    };

    serde_json::from_slice(body_bytes).map_err(|e| {
        error!(request_id = %request_id, error = %e, "Failed to deserialize request body");
        ValidationError::InvalidBody(format!("Invalid JSON: {}", e)).into()
    })
}

/// Serialize `payload` as a JSON response with the given status
pub fn json_response<T: Serialize>(
    status: u16,
    payload: &T,
    request_id: &str,
) -> Result<Response<Body>, ApiError> {
    let body = serde_json::to_string(payload).map_err(|e| {
        error!(request_id = %request_id, error = %e, "Failed to serialize response");
        ApiError::Internal(format!("Failed to serialize response: {}", e))
    })?;

    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}
