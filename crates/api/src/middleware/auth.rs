//! Authentication middleware and extractors.
//!
//! Provides an extractor for requiring a bearer access token in route
//! handlers. The extractor verifies the token and resolves the principal's
//! [`OwnerScope`] so handlers can't forget to scope their queries.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use duka_core::UserId;

use crate::db::OwnerScope;
use crate::error::ApiError;
use crate::services::auth::{TokenKind, tokens};
use crate::state::AppState;

/// Extractor that requires a valid bearer access token.
///
/// Rejects with 401 if the `Authorization` header is missing, malformed,
/// expired, or carries a refresh token instead of an access token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(user: CurrentUser) -> impl IntoResponse {
///     format!("Hello, user {}!", user.id)
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    /// The authenticated principal.
    pub id: UserId,
}

impl CurrentUser {
    /// The ownership scope for this principal's queries.
    #[must_use]
    pub const fn scope(&self) -> OwnerScope {
        OwnerScope::new(self.id)
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized)?;

        let user_id = tokens::verify(token, TokenKind::Access, state.jwt())
            .map_err(|_| ApiError::Unauthorized)?;

        Ok(Self { id: user_id })
    }
}
