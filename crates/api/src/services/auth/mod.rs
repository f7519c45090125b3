//! Authentication and registration service.
//!
//! Registration creates the identity and its customer profile as a single
//! logical unit and only mints tokens after the commit succeeds. Uniqueness
//! pre-checks here are advisory UX; the database constraints are the
//! race-safe guarantee.

mod error;
pub mod tokens;

pub use error::AuthError;
pub use tokens::{TokenKind, TokenPair};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use duka_core::{AccountCode, Phone, UserId};

use crate::config::JwtConfig;
use crate::db::customers::CustomerRepository;
use crate::db::users::UserRepository;
use crate::db::{OwnerScope, RepositoryError};
use crate::error::FieldErrors;
use crate::models::{Customer, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum username length.
const MAX_USERNAME_LENGTH: usize = 150;

/// Validated registration input.
#[derive(Debug)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
    pub phone: String,
    pub code: String,
}

/// Authentication service.
///
/// Handles registration, login, and token refresh.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    customers: CustomerRepository<'a>,
    jwt: &'a JwtConfig,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, jwt: &'a JwtConfig) -> Self {
        Self {
            users: UserRepository::new(pool),
            customers: CustomerRepository::new(pool),
            jwt,
        }
    }

    /// Register a new user with their customer profile.
    ///
    /// All-or-nothing: the user and customer are created in one transaction,
    /// and a duplicate detected at the constraint layer (even after the
    /// advisory pre-checks pass) rolls the whole registration back. Tokens
    /// are minted only after the commit.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` with field-level messages for bad
    /// input, `AuthError::RegistrationConflict` for duplicate
    /// username/code/linkage, or `AuthError::Repository` for other database
    /// errors.
    pub async fn register(
        &self,
        input: &Registration,
    ) -> Result<(User, Customer, TokenPair), AuthError> {
        let (phone, code) = validate_registration(input)?;

        // Advisory pre-checks for friendlier errors; the unique constraints
        // decide the race.
        if self.users.username_exists(&input.username).await? {
            return Err(AuthError::RegistrationConflict(
                "username already taken".to_owned(),
            ));
        }
        if self.customers.code_exists(&code).await? {
            return Err(AuthError::RegistrationConflict(
                "account code already in use".to_owned(),
            ));
        }

        let password_hash = hash_password(&input.password)?;

        let (user, customer) = self
            .users
            .create_with_customer(&input.username, &input.email, &password_hash, &phone, &code)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(msg) => AuthError::RegistrationConflict(msg),
                other => AuthError::Repository(other),
            })?;

        // Durability boundary passed; credentials are safe to mint.
        let pair = tokens::mint_pair(user.id, self.jwt)?;

        Ok((user, customer, pair))
    }

    /// Login with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username/password is
    /// wrong, without revealing which.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(User, TokenPair), AuthError> {
        let (user, password_hash) = self
            .users
            .get_password_hash(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        let pair = tokens::mint_pair(user.id, self.jwt)?;

        Ok((user, pair))
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the refresh token is bad.
    pub fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let user_id = tokens::verify(refresh_token, TokenKind::Refresh, self.jwt)?;
        tokens::mint(user_id, TokenKind::Access, self.jwt)
    }

    /// The profile behind a principal: the user and their customer, if any.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the user no longer exists.
    pub async fn profile(&self, user_id: UserId) -> Result<(User, Option<Customer>), AuthError> {
        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        let customer = self
            .customers
            .get_by_owner(OwnerScope::new(user_id))
            .await?;

        Ok((user, customer))
    }
}

/// Validate registration input, accumulating field-level messages.
fn validate_registration(input: &Registration) -> Result<(Phone, AccountCode), AuthError> {
    let mut errors = FieldErrors::new();

    if input.username.is_empty() {
        errors.push("username", "username cannot be empty");
    } else if input.username.len() > MAX_USERNAME_LENGTH {
        errors.push(
            "username",
            format!("username must be at most {MAX_USERNAME_LENGTH} characters"),
        );
    }

    if input.email.is_empty() {
        errors.push("email", "email cannot be empty");
    } else if !input.email.contains('@') {
        errors.push("email", "email must contain an @ symbol");
    }

    if let Err(message) = validate_password(&input.password) {
        errors.push("password", message);
    }
    if input.password != input.password2 {
        errors.push("password2", "passwords do not match");
    }

    let phone = match Phone::parse(&input.phone) {
        Ok(phone) => Some(phone),
        Err(e) => {
            errors.push("phone", e.to_string());
            None
        }
    };

    let code = match AccountCode::parse(&input.code) {
        Ok(code) => Some(code),
        Err(e) => {
            errors.push("code", e.to_string());
            None
        }
    };

    match (phone, code) {
        (Some(phone), Some(code)) if errors.is_empty() => Ok((phone, code)),
        _ => Err(AuthError::Validation(errors)),
    }
}

/// Validate a password against the complexity policy.
fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        ));
    }

    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err("password cannot be entirely numeric".to_owned());
    }

    Ok(())
}

/// Hash a password with argon2 and a fresh salt.
///
/// Public so management tooling can seed accounts without going through
/// the HTTP registration flow.
///
/// # Errors
///
/// Returns [`AuthError::PasswordHash`] if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| AuthError::PasswordHash)?;

    Ok(hash.to_string())
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, stored_hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| AuthError::PasswordHash)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_input() -> Registration {
        Registration {
            username: "alice".to_owned(),
            email: "alice@example.com".to_owned(),
            password: "Secur3Pass!".to_owned(),
            password2: "Secur3Pass!".to_owned(),
            phone: "+254700000001".to_owned(),
            code: "ALC01".to_owned(),
        }
    }

    #[test]
    fn valid_registration_passes() {
        let (phone, code) = validate_registration(&valid_input()).unwrap();
        assert_eq!(phone.as_str(), "+254700000001");
        assert_eq!(code.as_str(), "ALC01");
    }

    #[test]
    fn short_password_is_a_password_field_error() {
        let input = Registration {
            password: "short".to_owned(),
            password2: "short".to_owned(),
            ..valid_input()
        };
        let Err(AuthError::Validation(errors)) = validate_registration(&input) else {
            panic!("expected validation error");
        };
        assert!(errors.get("password").is_some());
    }

    #[test]
    fn numeric_password_is_rejected() {
        assert!(validate_password("1234567890").is_err());
        assert!(validate_password("Secur3Pass!").is_ok());
    }

    #[test]
    fn mismatched_confirmation_is_flagged() {
        let input = Registration {
            password2: "Different1!".to_owned(),
            ..valid_input()
        };
        let Err(AuthError::Validation(errors)) = validate_registration(&input) else {
            panic!("expected validation error");
        };
        assert!(errors.get("password2").is_some());
    }

    #[test]
    fn multiple_bad_fields_are_all_reported() {
        let input = Registration {
            username: String::new(),
            phone: "not a phone".to_owned(),
            code: "way-too-long-code".to_owned(),
            ..valid_input()
        };
        let Err(AuthError::Validation(errors)) = validate_registration(&input) else {
            panic!("expected validation error");
        };
        assert!(errors.get("username").is_some());
        assert!(errors.get("phone").is_some());
        assert!(errors.get("code").is_some());
    }

    #[test]
    fn password_round_trips_through_hash() {
        let hash = hash_password("Secur3Pass!").unwrap();
        assert!(verify_password("Secur3Pass!", &hash).is_ok());
        assert!(matches!(
            verify_password("WrongPass1!", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
