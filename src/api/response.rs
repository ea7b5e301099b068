//! Response types for the payroll API.
//!
//! This module defines the error response structures and the mapping from
//! engine errors to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates the error returned when the caller is not identified.
    pub fn missing_identity(header: &str) -> Self {
        Self::with_details(
            "UNAUTHENTICATED",
            "Caller identity is required",
            format!("Set the '{header}' header to the acting user's id"),
        )
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Pairs an error body with a status code.
    pub fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::ConfigNotFound { path } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            ),
            EngineError::ConfigParseError { path, message } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            ),
            EngineError::Validation { field, .. } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "VALIDATION_ERROR",
                    message,
                    format!("Check the '{}' field and retry", field),
                ),
            ),
            EngineError::NotFound { .. } => {
                ApiErrorResponse::new(StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", message))
            }
            EngineError::AlreadyProcessed { .. } => ApiErrorResponse::new(
                StatusCode::CONFLICT,
                ApiError::new("ALREADY_PROCESSED", message),
            ),
            EngineError::AlreadyRunning { .. } => ApiErrorResponse::new(
                StatusCode::CONFLICT,
                ApiError::new("ALREADY_RUNNING", message),
            ),
            EngineError::InvalidState { .. } => ApiErrorResponse::new(
                StatusCode::CONFLICT,
                ApiError::new("INVALID_STATE", message),
            ),
            EngineError::NotProcessed { .. } => ApiErrorResponse::new(
                StatusCode::CONFLICT,
                ApiError::new("NOT_PROCESSED", message),
            ),
            EngineError::CalculationError { message } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CALCULATION_ERROR", "Calculation failed", message),
            ),
            EngineError::Storage { message } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("STORAGE_ERROR", "Storage failure", message),
            ),
            EngineError::Serialization { message } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("SERIALIZATION_ERROR", "Serialization failure", message),
            ),
            EngineError::QueueClosed => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("QUEUE_CLOSED", message),
            ),
        }
    }
}
