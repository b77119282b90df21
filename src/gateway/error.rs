use lambda_http::{Body, Response};
use thiserror::Error;

use telemetry_gateway::shared::error::{error_codes, ErrorDetail, ErrorResponse};
use telemetry_gateway::shared::transform::TransformError;
use telemetry_gateway::shared::validators;

/// Realm advertised in `WWW-Authenticate` on 401 responses
const AUTH_REALM: &str = "telemetry-gateway";

/// Main error type for the gateway API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Not found error: {0}")]
    NotFound(#[from] NotFoundError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Authentication-specific errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization header is missing")]
    MissingToken,

    #[error("Authorization header format is invalid")]
    InvalidFormat,

    #[error("Bearer token is invalid")]
    InvalidToken,

    #[error("Bearer token has expired")]
    TokenExpired,
}

/// Validation-specific errors
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required field missing: {0}")]
    MissingField(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("{0}")]
    PropertyNotAllowed(String),

    #[error("Invalid value for field {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<validators::ValidationError> for ValidationError {
    fn from(err: validators::ValidationError) -> Self {
        ValidationError::InvalidValue {
            field: err.field,
            message: err.message,
        }
    }
}

impl From<validators::ValidationError> for ApiError {
    fn from(err: validators::ValidationError) -> Self {
        ApiError::Validation(err.into())
    }
}

/// Not found errors
#[derive(Debug, Error)]
pub enum NotFoundError {
    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("Resource not found")]
    ResourceNotFound,
}

/// Errors raised while talking to the platform
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Platform request failed: {0}")]
    Request(String),

    #[error("Platform returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Platform response could not be decoded: {0}")]
    Decode(String),

    #[error("Platform operation not supported: {0}")]
    Unsupported(&'static str),
}

impl From<reqwest::Error> for PlatformError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PlatformError::Decode(err.to_string())
        } else {
            PlatformError::Request(err.to_string())
        }
    }
}

impl From<TransformError> for PlatformError {
    fn from(err: TransformError) -> Self {
        PlatformError::Decode(err.to_string())
    }
}

impl ApiError {
    /// Convert error to HTTP response with appropriate status code and error payload
    pub fn to_http_response(&self, request_id: &str) -> Response<Body> {
        let (status, error_code, message, detail): (u16, &str, String, Option<ErrorDetail>) =
            match self {
                // Authentication errors
                ApiError::Auth(AuthError::MissingToken) => (
                    401,
                    error_codes::MISSING_TOKEN,
                    String::from("Authorization header is required"),
                    None,
                ),
                ApiError::Auth(AuthError::InvalidFormat) => (
                    401,
                    error_codes::UNAUTHORIZED,
                    String::from("Authorization header must use the Bearer scheme"),
                    None,
                ),
                ApiError::Auth(AuthError::InvalidToken) => (
                    401,
                    error_codes::INVALID_TOKEN,
                    String::from("Bearer token is invalid"),
                    None,
                ),
                ApiError::Auth(AuthError::TokenExpired) => (
                    401,
                    error_codes::TOKEN_EXPIRED,
                    String::from("Bearer token has expired"),
                    None,
                ),

                // Validation errors
                ApiError::Validation(ValidationError::MissingField(field)) => (
                    400,
                    error_codes::MISSING_FIELD,
                    format!("Required field missing: {}", field),
                    Some(ErrorDetail::new(field.as_str(), "Required field")),
                ),
                ApiError::Validation(ValidationError::InvalidBody(msg)) => {
                    (400, error_codes::INVALID_FORMAT, msg.clone(), None)
                }
                ApiError::Validation(ValidationError::PropertyNotAllowed(msg)) => (
                    400,
                    error_codes::PROPERTY_NOT_ALLOWED,
                    msg.clone(),
                    Some(ErrorDetail::new("property_name", msg.as_str())),
                ),
                ApiError::Validation(ValidationError::InvalidValue { field, message }) => (
                    400,
                    error_codes::INVALID_VALUE,
                    format!("Invalid value for field: {}", field),
                    Some(ErrorDetail::new(field.as_str(), message.as_str())),
                ),

                // Not found errors
                ApiError::NotFound(NotFoundError::LocationNotFound(id)) => (
                    404,
                    error_codes::LOCATION_NOT_FOUND,
                    format!("Location {} not found", id),
                    None,
                ),
                ApiError::NotFound(NotFoundError::ResourceNotFound) => (
                    404,
                    error_codes::NOT_FOUND,
                    String::from("Resource not found"),
                    None,
                ),

                // Platform errors
                ApiError::Platform(PlatformError::Unsupported(operation)) => (
                    501,
                    error_codes::NOT_IMPLEMENTED,
                    format!("{} is not available from the platform", operation),
                    None,
                ),
                ApiError::Platform(_) => (
                    502,
                    error_codes::PLATFORM_ERROR,
                    String::from("Upstream platform request failed"),
                    None,
                ),

                // Internal errors
                ApiError::Internal(_) => (
                    500,
                    error_codes::INTERNAL_ERROR,
                    String::from("Internal server error occurred"),
                    None,
                ),
            };

        let mut error_response = ErrorResponse::new(error_code, &message, request_id);
        if let Some(detail) = detail {
            error_response = error_response.with_detail(detail);
        }

        let body = error_response
            .to_json()
            .unwrap_or_else(|_| String::from(r#"{"error":"INTERNAL_ERROR","message":"Failed to serialize error response","request_id":""}"#));

        let mut builder = Response::builder()
            .status(status)
            .header("content-type", "application/json");

        if status == 401 {
            builder = builder.header(
                "WWW-Authenticate",
                format!(r#"Bearer realm="{}", error="{}""#, AUTH_REALM, error_code.to_lowercase()),
            );
        }

        builder.body(Body::from(body)).unwrap_or_else(|_| {
            let mut fallback = Response::new(Body::from(String::from(
                r#"{"error":"INTERNAL_ERROR","message":"Failed to build response"}"#,
            )));
            *fallback.status_mut() = lambda_http::http::StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        })
    }
}
