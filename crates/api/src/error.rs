//! Unified error handling with Sentry integration.
//!
//! Provides a unified `ApiError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, ApiError>`.
//!
//! Ownership misses deliberately map to 404, never 403: a caller probing
//! another customer's order ids must not be able to tell "missing" from
//! "someone else's".

use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::orders::OrderError;

/// Per-field validation messages, keyed by field name.
///
/// Serializes as `{"item": ["item cannot be empty"]}`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Create an empty set of field errors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field.
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    /// Create a set with a single field message.
    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    /// Whether any field has a message.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for a field, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body failed field-level validation.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// No (or invalid) bearer credential on a protected resource.
    #[error("authentication required")]
    Unauthorized,

    /// Resource missing, or owned by someone else.
    #[error("not found")]
    NotFound,

    /// Uniqueness conflict (duplicate code, already-linked identity).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(RepositoryError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Database(other),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(fields) => Self::Validation(fields),
            AuthError::InvalidCredentials | AuthError::InvalidToken => Self::Unauthorized,
            AuthError::RegistrationConflict(msg) => Self::Conflict(msg),
            AuthError::Repository(repo) => repo.into(),
            AuthError::PasswordHash => Self::Internal("password hashing failed".to_string()),
            AuthError::TokenEncoding(e) => Self::Internal(format!("token encoding failed: {e}")),
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Validation(fields) => Self::Validation(fields),
            OrderError::NoProfile => Self::Validation(FieldErrors::single(
                "customer",
                "no customer profile linked to this account",
            )),
            OrderError::Repository(repo) => repo.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let body = match &self {
            Self::Validation(fields) => json!(fields),
            Self::Unauthorized => json!({ "detail": "authentication required" }),
            Self::NotFound => json!({ "detail": "not found" }),
            Self::Conflict(msg) => json!({ "error": msg }),
            Self::Database(_) | Self::Internal(_) => {
                json!({ "detail": "internal server error" })
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            get_status(ApiError::Validation(FieldErrors::single("item", "empty"))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(get_status(ApiError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(get_status(ApiError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            get_status(ApiError::Conflict("code already in use".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(ApiError::Internal("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_ownership_miss_is_not_found() {
        // Cross-owner access surfaces exactly like a missing row.
        let err: ApiError = RepositoryError::NotFound.into();
        assert_eq!(get_status(err), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_field_errors_serialization() {
        let mut fields = FieldErrors::new();
        fields.push("item", "item cannot be empty");
        fields.push("amount", "amount must be positive");

        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(json["item"][0], "item cannot be empty");
        assert_eq!(json["amount"][0], "amount must be positive");
    }

    #[test]
    fn test_field_errors_display() {
        let fields = FieldErrors::single("amount", "must be positive");
        assert_eq!(fields.to_string(), "amount: must be positive");
    }
}
