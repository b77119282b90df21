use serde::{Deserialize, Serialize};

/// Field-level detail attached to an error response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub field: String,
    pub error: String,
}

impl ErrorDetail {
    pub fn new(field: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            error: error.into(),
        }
    }
}

/// Standard error response payload
/// Contains stable machine-readable error code, human-readable message, and request ID
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable machine-readable error code (e.g., "INVALID_VALUE", "UNAUTHORIZED")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Request ID for tracing and debugging
    pub request_id: String,

    /// Offending fields, omitted when empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ErrorDetail>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(
        error: impl Into<String>,
        message: impl Into<String>,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            request_id: request_id.into(),
            details: Vec::new(),
        }
    }

    pub fn with_detail(mut self, detail: ErrorDetail) -> Self {
        self.details.push(detail);
        self
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Common error codes used across the API
pub mod error_codes {
    // Authentication errors
    pub const MISSING_TOKEN: &str = "MISSING_TOKEN";
    pub const INVALID_TOKEN: &str = "INVALID_TOKEN";
    pub const TOKEN_EXPIRED: &str = "TOKEN_EXPIRED";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";

    // Validation errors
    pub const MISSING_FIELD: &str = "MISSING_FIELD";
    pub const INVALID_FORMAT: &str = "INVALID_FORMAT";
    pub const INVALID_VALUE: &str = "INVALID_VALUE";
    pub const PROPERTY_NOT_ALLOWED: &str = "PROPERTY_NOT_ALLOWED";

    // Not found errors
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const LOCATION_NOT_FOUND: &str = "LOCATION_NOT_FOUND";

    // Platform errors
    pub const PLATFORM_ERROR: &str = "PLATFORM_ERROR";
    pub const NOT_IMPLEMENTED: &str = "NOT_IMPLEMENTED";

    // Internal errors
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}
