//! JWT access/refresh token minting and verification.
//!
//! Access tokens are short-lived bearer credentials; refresh tokens are
//! longer-lived and only good for minting new access tokens. Both are HMAC
//! signed with the process-wide secret from [`JwtConfig`].

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use duka_core::UserId;

use super::AuthError;
use crate::config::JwtConfig;

/// Which credential a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims carried by every Duka token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's ID.
    pub sub: i32,
    /// Expiry (seconds since epoch).
    pub exp: i64,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Access or refresh.
    pub kind: TokenKind,
}

/// An access/refresh pair minted at registration or login.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Mint a single token of the given kind.
///
/// # Errors
///
/// Returns `AuthError::TokenEncoding` if signing fails.
pub fn mint(user_id: UserId, kind: TokenKind, config: &JwtConfig) -> Result<String, AuthError> {
    let ttl = match kind {
        TokenKind::Access => config.access_ttl_secs,
        TokenKind::Refresh => config.refresh_ttl_secs,
    };

    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.as_i32(),
        exp: now + i64::try_from(ttl).unwrap_or(i64::MAX),
        iat: now,
        kind,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.expose_secret().as_bytes()),
    )?;

    Ok(token)
}

/// Mint an access + refresh pair for a user.
///
/// # Errors
///
/// Returns `AuthError::TokenEncoding` if signing fails.
pub fn mint_pair(user_id: UserId, config: &JwtConfig) -> Result<TokenPair, AuthError> {
    Ok(TokenPair {
        access: mint(user_id, TokenKind::Access, config)?,
        refresh: mint(user_id, TokenKind::Refresh, config)?,
    })
}

/// Verify a token and return the principal it identifies.
///
/// Rejects expired tokens, bad signatures, and tokens of the wrong kind
/// (a refresh token is not a valid bearer credential, and vice versa).
///
/// # Errors
///
/// Returns `AuthError::InvalidToken` on any verification failure.
pub fn verify(token: &str, expected: TokenKind, config: &JwtConfig) -> Result<UserId, AuthError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.expose_secret().as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AuthError::InvalidToken)?;

    if data.claims.kind != expected {
        return Err(AuthError::InvalidToken);
    }

    Ok(UserId::new(data.claims.sub))
}
