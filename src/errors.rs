use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{auth::TokenError, security::PasswordError};

/// ApiError
///
/// The single error type surfaced at the request boundary. Every failure the
/// core can produce is a distinct variant with a distinct status mapping, so
/// callers (and tests) can tell outcomes apart without parsing messages.
///
/// Security posture: credential and token failures are reported with generic
/// wording only. Nothing in a response body may reveal whether an account
/// exists, echo a plaintext password, or include the signing secret.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Credential lifecycle failures (bad hashing input, wrong password,
    /// corrupt stored hash). See `PasswordError` for the sub-taxonomy.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Token failures (missing/malformed/bad-signature vs. expired).
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Ownership or self-reference violation. The request was authenticated
    /// but the principal is not allowed to act on this resource.
    #[error("{0}")]
    Forbidden(&'static str),

    /// A lookup by identifier found nothing. This is a deliberate departure
    /// from returning an empty resource with a success status.
    #[error("{0}")]
    NotFound(&'static str),

    /// Request payload failed validation (missing fields, bad email, ...).
    #[error("{0}")]
    Validation(String),

    /// A write conflicted with existing state (e.g. duplicate email or nick).
    #[error("{0}")]
    Conflict(&'static str),

    /// Opaque passthrough from the persistence collaborator. The detail is
    /// logged server-side and never leaked to the client.
    #[error("storage failure")]
    Storage(#[from] sqlx::Error),
}

impl ApiError {
    /// Maps each error kind to its HTTP status.
    ///
    /// Mismatch and both token kinds deliberately collapse to 401 at the
    /// transport level; the body message still distinguishes an expired token
    /// so clients can prompt a re-login.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Password(PasswordError::Credential) => StatusCode::BAD_REQUEST,
            ApiError::Password(PasswordError::Mismatch) => StatusCode::UNAUTHORIZED,
            ApiError::Password(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Token(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Storage(e) => {
                if is_unique_violation(e) {
                    StatusCode::CONFLICT
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(errors.to_string())
    }
}

impl IntoResponse for ApiError {
    /// Serializes the error as `{"error": "..."}` with the mapped status.
    ///
    /// Internal failures (storage, corrupt hash) are logged at error level and
    /// replaced with a generic message in the body.
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            ApiError::Storage(_) if status == StatusCode::CONFLICT => {
                "resource already exists".to_string()
            }
            _ if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!(error = %self, "internal error");
                "internal error".to_string()
            }
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Detects a unique-constraint violation inside an sqlx error so duplicate
/// registrations surface as 409 instead of a generic 500.
fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}
