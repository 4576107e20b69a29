//! Centralized error handling.
//!
//! Provides a unified error type for the entire application,
//! with automatic HTTP response conversion for non-form endpoints.
//! Form flows convert errors into user-facing messages through
//! [`crate::api::FlowOutcome`] instead.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::config::{
    MSG_ALL_FIELDS_REQUIRED, MSG_EMAIL_TAKEN, MSG_INVALID_LOGIN, MSG_USERNAME_TAKEN,
};

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Input
    #[error("{0}")]
    Validation(String),

    // Uniqueness
    #[error("Username already exists")]
    DuplicateUsername,

    #[error("Email already exists")]
    DuplicateEmail,

    // Authentication & Authorization
    #[error("Invalid credentials")]
    AuthenticationFailure,

    #[error("Authentication required")]
    Unauthorized,

    #[error("Stored password digest is malformed")]
    MalformedDigest,

    // Resource errors
    #[error("Resource not found")]
    NotFound,

    // External service errors
    #[error("File intake failed: {0}")]
    Intake(String),

    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    #[error("Session store error: {0}")]
    Cache(String),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl AppError {
    /// Get error code for client
    fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::DuplicateUsername => "DUPLICATE_USERNAME",
            AppError::DuplicateEmail => "DUPLICATE_EMAIL",
            AppError::AuthenticationFailure => "INVALID_CREDENTIALS",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::MalformedDigest => "INTERNAL_ERROR",
            AppError::NotFound => "NOT_FOUND",
            AppError::Intake(_) => "INTAKE_ERROR",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Cache(_) => "SESSION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateUsername | AppError::DuplicateEmail => StatusCode::CONFLICT,
            AppError::AuthenticationFailure | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::MalformedDigest
            | AppError::Intake(_)
            | AppError::Database(_)
            | AppError::Cache(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the error is the caller's to fix (re-render the form).
    pub fn is_recoverable(&self) -> bool {
        self.status().is_client_error()
    }

    /// User-facing message for recoverable errors, `None` for errors whose
    /// detail must stay internal.
    pub fn public_message(&self) -> Option<String> {
        match self {
            AppError::Validation(msg) => Some(msg.clone()),
            AppError::DuplicateUsername => Some(MSG_USERNAME_TAKEN.to_string()),
            AppError::DuplicateEmail => Some(MSG_EMAIL_TAKEN.to_string()),
            AppError::AuthenticationFailure => Some(MSG_INVALID_LOGIN.to_string()),
            AppError::Unauthorized | AppError::NotFound => Some(self.to_string()),
            _ => None,
        }
    }

    /// Log internal detail for server-side errors.
    pub fn log(&self) {
        match self {
            AppError::Database(e) => tracing::error!("Database error: {:?}", e),
            AppError::Intake(msg) => tracing::error!("File intake error: {}", msg),
            AppError::Cache(msg) => tracing::error!("Session store error: {}", msg),
            AppError::MalformedDigest => tracing::error!("Malformed password digest in store"),
            AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
            _ => tracing::debug!("Request rejected: {}", self),
        }
    }

    /// Get user-facing message (hides internal details)
    fn user_message(&self) -> String {
        self.log();
        self.public_message()
            .unwrap_or_else(|| "An internal error occurred".to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code().to_string(),
                message: self.user_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}

/// Convenience constructors
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    /// Field-agnostic validation error for missing input.
    pub fn fields_required() -> Self {
        AppError::Validation(MSG_ALL_FIELDS_REQUIRED.to_string())
    }

    pub fn intake(msg: impl Into<String>) -> Self {
        AppError::Intake(msg.into())
    }

    pub fn cache(msg: impl Into<String>) -> Self {
        AppError::Cache(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
