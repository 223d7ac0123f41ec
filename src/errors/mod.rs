//! Error handling module for the blog backend.
//!
//! Provides the error taxonomy shared by the stores, the auth service and the HTTP glue,
//! with mapping to HTTP status codes and the JSON error envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const STORAGE_CORRUPT: &str = "STORAGE_CORRUPT";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const INVALID_CREDENTIALS: &str = "INVALID_CREDENTIALS";
    pub const SECRET_TOO_SHORT: &str = "SECRET_TOO_SHORT";
    pub const TOKEN_INVALID: &str = "TOKEN_INVALID";
    pub const TOKEN_EXPIRED: &str = "TOKEN_EXPIRED";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Application error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// No bearer token presented
    Unauthorized(String),
    /// Entity absent on a mutating path
    NotFound(String),
    /// Rejected input
    Validation(String),
    /// Backing file exists but cannot be parsed, or a stored record is malformed
    StorageCorrupt(String),
    /// I/O failure on a backing file
    Storage(String),
    /// Login declined
    InvalidCredentials,
    /// Signing secret below the minimum length
    SecretTooShort { min: usize, actual: usize },
    /// Token signature or structure is bad
    TokenInvalid,
    /// Token is past its expiry
    TokenExpired,
    /// Internal error
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::StorageCorrupt(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidCredentials => StatusCode::BAD_REQUEST,
            AppError::SecretTooShort { .. } => StatusCode::BAD_REQUEST,
            AppError::TokenInvalid => StatusCode::UNAUTHORIZED,
            AppError::TokenExpired => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::StorageCorrupt(_) => codes::STORAGE_CORRUPT,
            AppError::Storage(_) => codes::STORAGE_ERROR,
            AppError::InvalidCredentials => codes::INVALID_CREDENTIALS,
            AppError::SecretTooShort { .. } => codes::SECRET_TOO_SHORT,
            AppError::TokenInvalid => codes::TOKEN_INVALID,
            AppError::TokenExpired => codes::TOKEN_EXPIRED,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Validation(msg) => msg.clone(),
            AppError::StorageCorrupt(msg) => msg.clone(),
            AppError::Storage(msg) => msg.clone(),
            AppError::InvalidCredentials => "Invalid username or password".to_string(),
            AppError::SecretTooShort { min, actual } => format!(
                "Secret must be at least {} characters long (got {})",
                min, actual
            ),
            AppError::TokenInvalid => "Session token is invalid".to_string(),
            AppError::TokenExpired => "Session token has expired".to_string(),
            AppError::Internal(msg) => msg.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!("Storage I/O error: {:?}", err);
        AppError::Storage(format!("Storage error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::StorageCorrupt(format!("JSON error: {}", err))
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => AppError::TokenInvalid,
        }
    }
}

/// Error details in the response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        let details = match error {
            AppError::SecretTooShort { min, actual } => {
                Some(serde_json::json!({ "minLength": min, "actualLength": actual }))
            }
            _ => None,
        };

        Self {
            success: false,
            error: ErrorDetails {
                code: error.error_code().to_string(),
                message: error.message(),
                details,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse::new(&self);
        (status, Json(body)).into_response()
    }
}
