//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! It centralizes error management, providing a consistent way to handle and represent
//! the failure taxonomy of the auth core and the task API.
//!
//! `AppError` implements `actix_web::error::ResponseError` to convert application
//! errors into JSON `{"message": ...}` responses. The client contract only uses
//! 400 and 401: missing records and persistence failures surface as 400 with the
//! underlying message, credential and token failures as 401. `Configuration` is
//! the one exception; it marks a programmer error (broken caller contract,
//! missing app data) and maps to 500.
//!
//! `From` implementations for `sqlx::Error`, `validator::ValidationErrors`,
//! and `bcrypt::BcryptError` allow handlers to use the `?` operator
//! throughout. JWT failures carry their own classification (`TokenError`) and
//! are mapped at the call sites instead.

use actix_web::{error::ResponseError, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Represents all client-observable failures of the application.
#[derive(Debug)]
pub enum AppError {
    /// Malformed request, failed validation, missing credential material,
    /// or a persistence failure (HTTP 400).
    BadRequest(String),
    /// Credential or token-signature mismatch, revoked token (HTTP 401).
    Unauthorized(String),
    /// A record the request referred to does not exist. The API contract maps
    /// missing users and tasks to 400 with a message; 404 is reserved for
    /// unmatched routes.
    NotFound(String),
    /// Programmer error: broken caller contract or missing wiring (HTTP 500).
    /// Never part of the client-facing contract.
    Configuration(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Configuration(msg) => write!(f, "Configuration Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::BadRequest(msg) | AppError::NotFound(msg) => {
                HttpResponse::BadRequest().json(json!({ "message": msg }))
            }
            AppError::Unauthorized(msg) => {
                HttpResponse::Unauthorized().json(json!({ "message": msg }))
            }
            AppError::Configuration(msg) => {
                // Internal details stay out of the body; the message goes to the log.
                log::error!("configuration error: {}", msg);
                HttpResponse::InternalServerError().json(json!({ "message": "Internal error" }))
            }
        }
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` becomes `NotFound`; every other persistence error surfaces as
/// 400 with the underlying message, per the API contract (no 500s).
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::BadRequest(error.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::BadRequest(error.to_string())
    }
}

/// Hashing errors surface as 400 with the bcrypt message, matching the
/// registration/change-password contract.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::BadRequest(error.to_string())
    }
}
