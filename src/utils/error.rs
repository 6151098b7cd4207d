//! Error handling for the CMS backend
//!
//! This module defines the error type used throughout the crate and its
//! mapping onto HTTP responses.

use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Result type alias for the CMS backend
pub type Result<T> = std::result::Result<T, CmsError>;

/// Main error type for the CMS backend
#[derive(Error, Debug)]
pub enum CmsError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Session token errors
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Authentication errors (bad credentials, inactive account)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Unauthenticated access to a protected endpoint; carries the
    /// originally requested path for the post-login redirect
    #[error("Login required")]
    LoginRequired {
        /// Path the client tried to reach
        next: String,
    },

    /// Authenticated but missing a required role
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Authenticated but missing a required permission; rendered as a
    /// denial notice with a safe redirect to the landing page
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Validation errors (malformed registration input etc.)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Conflict errors (duplicate unique key)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Crypto errors
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Internal server errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl CmsError {
    /// Create an authentication error
    pub fn auth<S: Into<String>>(msg: S) -> Self {
        Self::Auth(msg.into())
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a conflict error
    pub fn conflict<S: Into<String>>(msg: S) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create a not-found error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }
}

/// Error payload returned to HTTP clients
#[derive(Debug, serde::Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: &'a str,
}

impl ErrorBody<'_> {
    fn json(status: StatusCode, message: &str) -> HttpResponse {
        HttpResponse::build(status).json(ErrorBody {
            success: false,
            error: message,
        })
    }
}

impl ResponseError for CmsError {
    fn status_code(&self) -> StatusCode {
        match self {
            CmsError::Validation(_) => StatusCode::BAD_REQUEST,
            CmsError::Auth(_) => StatusCode::UNAUTHORIZED,
            CmsError::LoginRequired { .. } => StatusCode::FOUND,
            CmsError::Forbidden(_) => StatusCode::FORBIDDEN,
            CmsError::PermissionDenied(_) => StatusCode::SEE_OTHER,
            CmsError::NotFound(_) => StatusCode::NOT_FOUND,
            CmsError::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            // Redirect to the login entry point, preserving the destination
            CmsError::LoginRequired { next } => HttpResponse::Found()
                .insert_header((
                    header::LOCATION,
                    format!("/auth/login?next={}", urlencoding::encode(next)),
                ))
                .json(ErrorBody {
                    success: false,
                    error: "Login required",
                }),
            // Denial notice with a safe redirect to a neutral page
            CmsError::PermissionDenied(msg) => HttpResponse::SeeOther()
                .insert_header((header::LOCATION, "/"))
                .json(ErrorBody {
                    success: false,
                    error: msg,
                }),
            CmsError::Validation(msg) => ErrorBody::json(StatusCode::BAD_REQUEST, msg),
            CmsError::Auth(msg) => ErrorBody::json(StatusCode::UNAUTHORIZED, msg),
            CmsError::Forbidden(msg) => ErrorBody::json(StatusCode::FORBIDDEN, msg),
            CmsError::NotFound(msg) => ErrorBody::json(StatusCode::NOT_FOUND, msg),
            CmsError::Conflict(msg) => ErrorBody::json(StatusCode::CONFLICT, msg),
            // Everything else is a server fault; do not leak internals
            _ => ErrorBody::json(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
            ),
        }
    }
}
