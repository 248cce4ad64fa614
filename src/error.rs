//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::auth::{PasswordError, TokenError};
use crate::domain::DomainError;

/// Message returned for every 5xx response
const INTERNAL_MESSAGE: &str = "Internal server error";

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Missing or invalid access token")]
    Unauthorized,

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Server errors (5xx)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AppError {
    /// HTTP status, machine-readable code and optional details
    fn parts(&self) -> (StatusCode, &'static str, Option<String>) {
        match self {
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),

            AppError::Domain(domain_err) => match domain_err {
                // 409 Conflict
                DomainError::EmailTaken(_) => (StatusCode::CONFLICT, "email_taken", None),
                DomainError::ProfileAlreadyExists => {
                    (StatusCode::CONFLICT, "profile_already_exists", None)
                }

                // 401 Unauthorized
                DomainError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, "invalid_credentials", None)
                }

                // 404 Not Found
                DomainError::RecipientNotFound(email) => {
                    (StatusCode::NOT_FOUND, "recipient_not_found", Some(email.clone()))
                }
                DomainError::CoinNotFound(symbol) => {
                    (StatusCode::NOT_FOUND, "coin_not_found", Some(symbol.clone()))
                }
                DomainError::WalletNotFound { symbol } => {
                    (StatusCode::NOT_FOUND, "wallet_not_found", Some(symbol.clone()))
                }
                DomainError::ProfileNotFound => (StatusCode::NOT_FOUND, "profile_not_found", None),

                // 400 Bad Request
                DomainError::InsufficientFunds { .. } => {
                    (StatusCode::BAD_REQUEST, "insufficient_funds", None)
                }
                DomainError::SelfTransfer => (StatusCode::BAD_REQUEST, "self_transfer", None),
                DomainError::InvalidAmount(msg) => {
                    (StatusCode::BAD_REQUEST, "invalid_amount", Some(msg.clone()))
                }
                DomainError::InvalidProfile(value) => {
                    (StatusCode::BAD_REQUEST, "invalid_profile", Some(value.clone()))
                }

                // 500 Missing seed data
                DomainError::TransactionTypeNotFound(kind) => {
                    tracing::error!("Transaction type {} is not seeded", kind);
                    (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error", None)
                }
            },

            // 500 Internal Server Error
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", None)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = self.parts();

        let error = if status.is_server_error() {
            INTERNAL_MESSAGE.to_string()
        } else {
            self.to_string()
        };

        let body = ErrorResponse {
            error,
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Malformed, mistyped or incomplete JSON bodies are client errors
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid(_) => AppError::Unauthorized,
            TokenError::Encode(e) => AppError::Internal(e.to_string()),
        }
    }
}
