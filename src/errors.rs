// ABOUTME: Unified error handling for the Trimbook booking API
// ABOUTME: Defines AppError variants, failure categories, HTTP mapping and transient retry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trimbook Contributors

//! # Unified Error Handling System
//!
//! Every failing operation in this crate returns a specific [`AppError`]
//! variant, never a bare boolean or a stringly-typed status. Variants are
//! partitioned into [`ErrorCategory`] groups so callers can tell bad input
//! from authorization failures from state conflicts, and so the retry
//! helper only ever retries transient store faults.

use crate::constants::{limits, timeouts};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{error, warn};

/// Convenient result alias used throughout the crate
pub type AppResult<T> = Result<T, AppError>;

/// Failure categories driving caller-side handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed or rejected caller input; surfaced verbatim, never retried
    ClientInput,
    /// Caller identity missing, invalid, or insufficient for the operation
    Authorization,
    /// Request conflicts with current system state; re-read before retrying
    State,
    /// Infrastructure fault that may clear on its own; bounded retry only
    Transient,
    /// Unexpected internal fault; details stay server-side
    Internal,
}

/// Unified error type for the application
#[derive(Debug, Error)]
pub enum AppError {
    /// Registration email already belongs to an account
    #[error("An account with email '{email}' already exists")]
    DuplicateEmail {
        /// The conflicting email, lowercased
        email: String,
    },
    /// Registration password too short
    #[error("Password must be at least {} characters", limits::MIN_PASSWORD_LENGTH)]
    WeakPassword,
    /// Login email/password pair did not match; deliberately uniform for
    /// unknown email and wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,
    /// Availability window bounds rejected
    #[error("Invalid availability window: {reason}")]
    InvalidWindow {
        /// Why the window was rejected
        reason: String,
    },
    /// Review rating outside the accepted range
    #[error("Rating must be between {} and {}, got {rating}", limits::MIN_RATING, limits::MAX_RATING)]
    InvalidRating {
        /// The rejected rating
        rating: i64,
    },
    /// Appointment names a service the provider does not own
    #[error("Service does not belong to the requested provider")]
    ServiceNotOwnedByProvider,
    /// Generic malformed input from the transport layer
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// What was wrong with the input
        message: String,
    },
    /// Referenced entity does not exist
    #[error("{what} not found")]
    NotFound {
        /// Human-readable name of the missing entity
        what: String,
    },

    /// No usable bearer token on an authenticated endpoint
    #[error("Authentication required: {reason}")]
    AuthRequired {
        /// Why the request counts as unauthenticated
        reason: String,
    },
    /// Session token past its expiry instant
    #[error("Session token has expired")]
    ExpiredToken,
    /// Session token failed signature or structural validation
    #[error("Session token is invalid: {reason}")]
    InvalidToken {
        /// Validation failure detail
        reason: String,
    },
    /// Session token verified but its subject no longer resolves to an account
    #[error("Session token subject does not match any account")]
    UnknownSubject,
    /// Authenticated caller may not perform this operation
    #[error("Not authorized: {message}")]
    Unauthorized {
        /// What the caller attempted
        message: String,
    },
    /// Operation requires a provider-role account
    #[error("Account is not a provider")]
    NotAProvider,

    /// Requested status change is not a legal state-machine edge
    #[error("Cannot transition appointment from '{from}' to '{to}'")]
    InvalidTransition {
        /// Current status
        from: String,
        /// Requested status
        to: String,
    },
    /// Appointment already has its one permitted review
    #[error("Appointment has already been reviewed")]
    AlreadyReviewed,
    /// Review attempted before the appointment completed
    #[error("Appointment is not completed yet")]
    NotCompleted,
    /// Requested slot is outside published windows or collides with a booking
    #[error("Requested slot is not available")]
    SlotUnavailable,

    /// Transient infrastructure failure that outlived its retry budget
    #[error("Service temporarily unavailable, please retry")]
    Unavailable,

    /// Store-level failure with the underlying cause attached
    #[error("Database operation failed")]
    Database(#[from] anyhow::Error),
    /// Any other unexpected internal failure
    #[error("Internal error: {message}")]
    Internal {
        /// Internal diagnostic, not exposed over HTTP
        message: String,
    },
}

impl AppError {
    /// Create a generic invalid-input error
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a not-found error for the named entity
    #[must_use]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Create an authentication-required error
    #[must_use]
    pub fn auth_required(reason: impl Into<String>) -> Self {
        Self::AuthRequired {
            reason: reason.into(),
        }
    }

    /// Create an authorization error for the attempted action
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Create an invalid-window error
    #[must_use]
    pub fn invalid_window(reason: impl Into<String>) -> Self {
        Self::InvalidWindow {
            reason: reason.into(),
        }
    }

    /// Create an internal error
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Stable machine-readable code for this error
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::DuplicateEmail { .. } => "DUPLICATE_EMAIL",
            Self::WeakPassword => "WEAK_PASSWORD",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidWindow { .. } => "INVALID_WINDOW",
            Self::InvalidRating { .. } => "INVALID_RATING",
            Self::ServiceNotOwnedByProvider => "SERVICE_NOT_OWNED_BY_PROVIDER",
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::NotFound { .. } => "RESOURCE_NOT_FOUND",
            Self::AuthRequired { .. } => "AUTH_REQUIRED",
            Self::ExpiredToken => "TOKEN_EXPIRED",
            Self::InvalidToken { .. } => "TOKEN_INVALID",
            Self::UnknownSubject => "UNKNOWN_SUBJECT",
            Self::Unauthorized { .. } => "PERMISSION_DENIED",
            Self::NotAProvider => "NOT_A_PROVIDER",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::AlreadyReviewed => "ALREADY_REVIEWED",
            Self::NotCompleted => "NOT_COMPLETED",
            Self::SlotUnavailable => "SLOT_UNAVAILABLE",
            Self::Unavailable => "TEMPORARILY_UNAVAILABLE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// The failure category this error belongs to
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::DuplicateEmail { .. }
            | Self::WeakPassword
            | Self::InvalidCredentials
            | Self::InvalidWindow { .. }
            | Self::InvalidRating { .. }
            | Self::ServiceNotOwnedByProvider
            | Self::InvalidInput { .. }
            | Self::NotFound { .. } => ErrorCategory::ClientInput,

            Self::AuthRequired { .. }
            | Self::ExpiredToken
            | Self::InvalidToken { .. }
            | Self::UnknownSubject
            | Self::Unauthorized { .. }
            | Self::NotAProvider => ErrorCategory::Authorization,

            Self::InvalidTransition { .. }
            | Self::AlreadyReviewed
            | Self::NotCompleted
            | Self::SlotUnavailable => ErrorCategory::State,

            Self::Unavailable => ErrorCategory::Transient,

            Self::Database(_) | Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            // 400 Bad Request
            Self::WeakPassword
            | Self::InvalidWindow { .. }
            | Self::InvalidRating { .. }
            | Self::ServiceNotOwnedByProvider
            | Self::InvalidInput { .. } => 400,

            // 401 Unauthorized
            Self::InvalidCredentials
            | Self::AuthRequired { .. }
            | Self::ExpiredToken
            | Self::InvalidToken { .. }
            | Self::UnknownSubject => 401,

            // 403 Forbidden
            Self::Unauthorized { .. } | Self::NotAProvider => 403,

            // 404 Not Found
            Self::NotFound { .. } => 404,

            // 409 Conflict
            Self::DuplicateEmail { .. }
            | Self::InvalidTransition { .. }
            | Self::AlreadyReviewed
            | Self::NotCompleted
            | Self::SlotUnavailable => 409,

            // 503 Service Unavailable
            Self::Unavailable => 503,

            // 500 Internal Server Error
            Self::Database(_) | Self::Internal { .. } => 500,
        }
    }

    /// Check whether this error may clear on its own and is worth retrying
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Unavailable => true,
            Self::Database(source) => is_transient_error(&format!("{source:?}")),
            _ => false,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(anyhow::Error::new(err))
    }
}

/// Wire format for error responses
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error payload
    pub error: ErrorDetail,
}

/// Inner error payload of [`ErrorResponse`]
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Stable machine-readable code
    pub code: String,
    /// Failure category
    pub category: ErrorCategory,
    /// Human-readable message
    pub message: String,
}

impl ErrorResponse {
    /// Build the wire representation of an error
    #[must_use]
    pub fn from_error(err: &AppError) -> Self {
        // Internal detail stays in the logs; callers get a generic message.
        let message = match err.category() {
            ErrorCategory::Internal => "An internal server error occurred".into(),
            _ => err.to_string(),
        };
        Self {
            error: ErrorDetail {
                code: err.code().into(),
                category: err.category(),
                message,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self.category(), ErrorCategory::Internal) {
            error!(code = self.code(), error = ?self, "Request failed with internal error");
        }
        let status = StatusCode::from_u16(self.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorResponse::from_error(&self))).into_response()
    }
}

/// Check if a store error is transient and worth retrying
///
/// Retryable: SQLite lock/busy contention and pool or statement timeouts.
/// Constraint violations and malformed queries are permanent failures and
/// must surface immediately.
fn is_transient_error(error_msg: &str) -> bool {
    let error_lower = error_msg.to_lowercase();

    if error_lower.contains("unique constraint")
        || error_lower.contains("foreign key constraint")
        || error_lower.contains("check constraint")
        || error_lower.contains("not null constraint")
    {
        return false;
    }

    if error_lower.contains("database is locked")
        || error_lower.contains("locked")
        || error_lower.contains("busy")
    {
        return true;
    }

    if error_lower.contains("timeout") || error_lower.contains("timed out") {
        return true;
    }

    // Conservative default: do not retry unknown errors
    false
}

/// Retry an operation across transient store failures
///
/// Non-transient errors propagate immediately. Transient errors are retried
/// with exponential backoff; when the attempt budget is spent the caller
/// receives [`AppError::Unavailable`] rather than the raw store error.
///
/// # Errors
///
/// Returns the operation's own error for non-transient failures, or
/// [`AppError::Unavailable`] after exhausting retries.
pub async fn retry_transient<F, Fut, T>(mut f: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut attempts = 0;
    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if !e.is_transient() {
                    return Err(e);
                }
                attempts += 1;
                if attempts >= limits::MAX_TRANSIENT_RETRIES {
                    error!(
                        attempts,
                        error = %e,
                        "Operation failed after exhausting transient retries"
                    );
                    return Err(AppError::Unavailable);
                }
                let backoff_ms = timeouts::RETRY_BACKOFF_BASE_MS * (1 << attempts);
                warn!(
                    attempt = attempts,
                    backoff_ms,
                    error = %e,
                    "Transient store failure, retrying after backoff"
                );
                sleep(Duration::from_millis(backoff_ms)).await;
            }
        }
    }
}
