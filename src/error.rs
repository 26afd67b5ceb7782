//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the service.
//! Every failure a caller can observe, from a bad token to a missing task, is one of its
//! variants, so handlers can return `Result<_, AppError>` and rely on `?`.
//!
//! `AppError` implements `actix_web::error::ResponseError`, which turns each variant into
//! an HTTP status and a `{"error": ...}` JSON body. `From` implementations cover
//! `sqlx::Error`, `validator::ValidationErrors`, `jsonwebtoken::errors::Error` and
//! `bcrypt::BcryptError`.

use actix_web::{
    error::ResponseError,
    http::{header, StatusCode},
    HttpResponse,
};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Message returned for every rejected token, whatever the underlying cause.
pub const TOKEN_REJECTED: &str = "Could not validate credentials";

/// Message returned for every failed login, whatever the underlying cause.
pub const LOGIN_REJECTED: &str = "Incorrect username or password";

/// Represents all possible errors that can occur within the service.
#[derive(Debug)]
pub enum AppError {
    /// Missing, invalid or expired token, or bad login credentials (HTTP 401).
    Unauthorized(String),
    /// Malformed or invalid request outside the task endpoints (HTTP 400).
    BadRequest(String),
    /// A unique key, such as a username, is already taken (HTTP 400).
    AlreadyExists(String),
    /// The referenced entity does not exist (HTTP 404).
    NotFound(String),
    /// Unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// Error originating from the store (HTTP 500). The detail is logged, not returned.
    DatabaseError(String),
    /// Failed input validation on task payloads (HTTP 422 Unprocessable Entity).
    ValidationError(String),
    /// Invalid or missing process configuration.
    Config(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::AlreadyExists(msg) => write!(f, "Already Exists: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::Config(msg) => write!(f, "Configuration Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) | AppError::AlreadyExists(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) | AppError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        match self {
            AppError::Unauthorized(msg) => response
                .insert_header((header::WWW_AUTHENTICATE, "Bearer"))
                .json(json!({ "error": msg })),
            // Store failures are presented as a generic server error.
            AppError::DatabaseError(msg) => {
                log::error!("database error: {}", msg);
                response.json(json!({ "error": "Internal server error" }))
            }
            AppError::BadRequest(msg)
            | AppError::AlreadyExists(msg)
            | AppError::NotFound(msg)
            | AppError::InternalServerError(msg)
            | AppError::ValidationError(msg)
            | AppError::Config(msg) => response.json(json!({ "error": msg })),
        }
    }
}

/// `RowNotFound` becomes `NotFound`, a UNIQUE violation becomes `AlreadyExists`,
/// everything else is a `DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::AlreadyExists(db.message().to_string())
            }
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(error: sqlx::migrate::MigrateError) -> AppError {
        AppError::DatabaseError(error.to_string())
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
///
/// The detailed validation messages are preserved.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// Any JWT failure is reported with the same message so callers cannot tell
/// an expired token from a forged one.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        log::debug!("token rejected: {}", error);
        AppError::Unauthorized(TOKEN_REJECTED.into())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}
