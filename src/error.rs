//! Domain error types for the upload handler.
//!
//! Uses thiserror for ergonomic error handling with automatic Display implementations.
//! Only request-level failures live here; per-file failures are recorded in the
//! upload report and never abort a request.

use actix_multipart::MultipartError;
use actix_web::error::PayloadError;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use std::fmt;

use crate::services::storage::StorageError;

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Multipart body could not be decoded
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// Multipart body exceeds the configured total size
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),

    /// Storage backend failed outside of an upload pipeline
    #[error("Storage error: {0}")]
    Storage(String),

    /// Too many requests in flight
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error_code, response_message) = match self {
            AppError::MalformedRequest(_) => ("MALFORMED_REQUEST", self.to_string()),
            AppError::PayloadTooLarge(_) => ("PAYLOAD_TOO_LARGE", self.to_string()),
            AppError::NotFound(_) => ("NOT_FOUND", self.to_string()),
            AppError::Storage(err_str) => {
                tracing::error!("Storage error: {}", err_str);
                (
                    "STORAGE_ERROR",
                    "An internal storage error occurred".to_string(),
                )
            }
            AppError::ServiceUnavailable(_) => ("SERVICE_UNAVAILABLE", self.to_string()),
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: error_code.to_string(),
            message: response_message,
        })
    }
}

/// Error response body.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        match err {
            MultipartError::Payload(PayloadError::Overflow) => {
                AppError::PayloadTooLarge("Request body exceeds the configured limit".to_string())
            }
            other => AppError::MalformedRequest(format!("Multipart error: {}", other)),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(name) | StorageError::InvalidName(name) => {
                AppError::NotFound(format!("File {}", name))
            }
            other => AppError::Storage(other.to_string()),
        }
    }
}
