//! Error types for the lending server

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Fine-grained error codes reported alongside every failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthorized = 2,
    BookNotFound = 3,
    BorrowerNotFound = 4,
    LogNotFound = 5,
    DuplicateEmail = 6,
    DuplicateUsername = 7,
    BookAlreadyExists = 8,
    BadValue = 9,
    InvalidCount = 10,
    InvalidLoanPeriod = 11,
    BookUnavailable = 12,
    InsufficientCopies = 13,
    InsufficientActiveLoans = 14,
    BorrowerHasActiveLoans = 15,
    AvailabilityOverflow = 16,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {1}")]
    NotFound(ErrorCode, String),

    #[error("Conflict: {1}")]
    Conflict(ErrorCode, String),

    #[error("Invalid argument: {1}")]
    InvalidArgument(ErrorCode, String),

    #[error("Precondition failed: {1}")]
    PreconditionFailed(ErrorCode, String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// The fine-grained code carried by this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::NotFound(code, _)
            | AppError::Conflict(code, _)
            | AppError::InvalidArgument(code, _)
            | AppError::PreconditionFailed(code, _) => *code,
            AppError::Authentication(_) => ErrorCode::NotAuthorized,
            AppError::Internal(_) => ErrorCode::Failure,
        }
    }

    pub fn book_not_found(id: &str) -> Self {
        AppError::NotFound(ErrorCode::BookNotFound, format!("Book {} not found", id))
    }

    pub fn borrower_not_found(id: impl std::fmt::Display) -> Self {
        AppError::NotFound(
            ErrorCode::BorrowerNotFound,
            format!("Borrower {} not found", id),
        )
    }

    pub fn log_not_found(id: impl std::fmt::Display) -> Self {
        AppError::NotFound(ErrorCode::LogNotFound, format!("Borrow log {} not found", id))
    }

    pub fn invalid_count(count: u32) -> Self {
        AppError::InvalidArgument(
            ErrorCode::InvalidCount,
            format!("Count must be at least 1 (got {})", count),
        )
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::InvalidArgument(ErrorCode::BadValue, errors.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidArgument(ErrorCode::BadValue, rejection.body_text())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, message) = match self {
            AppError::NotFound(_, msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(_, msg) => (StatusCode::CONFLICT, msg),
            AppError::InvalidArgument(_, msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::PreconditionFailed(_, msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::Authentication(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
