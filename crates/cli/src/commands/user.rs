//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! # Register a user with their customer profile
//! duka user create -u alice -e alice@example.com -p +254700000001 -c ALC01
//! ```
//!
//! The password is read interactively (entered twice) so it never lands
//! in shell history.
//!
//! # Environment Variables
//!
//! - `DUKA_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)

use duka_api::db::users::UserRepository;
use duka_api::db::RepositoryError;
use duka_api::services::auth;
use duka_core::{AccountCode, Phone};
use sqlx::PgPool;
use std::io::{BufRead, Write};
use thiserror::Error;

/// Errors that can occur during user management.
#[derive(Debug, Error)]
pub enum UserError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Invalid phone number.
    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    /// Invalid account code.
    #[error("Invalid account code: {0}")]
    InvalidCode(String),

    /// The two password entries did not match.
    #[error("Password entries did not match")]
    PasswordMismatch,

    /// Password failed the strength policy.
    #[error("Password must be at least 8 characters and not entirely numeric")]
    WeakPassword,

    /// Password hashing failed.
    #[error("Failed to hash password")]
    PasswordHash,

    /// Repository error (including uniqueness conflicts).
    #[error("{0}")]
    Repository(#[from] RepositoryError),

    /// Terminal I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Register a new user together with their customer profile.
///
/// Applies the same field rules as the HTTP registration endpoint, so an
/// account created here is indistinguishable from a self-registered one.
///
/// # Errors
///
/// Returns a [`UserError`] if any field is invalid, the password entries
/// disagree, or the insert hits a uniqueness conflict.
pub async fn create(username: &str, email: &str, phone: &str, code: &str) -> Result<(), UserError> {
    dotenvy::dotenv().ok();

    // Basic email validation
    if !email.contains('@') || !email.contains('.') {
        return Err(UserError::InvalidEmail(email.to_owned()));
    }

    let phone = Phone::parse(phone).map_err(|e| UserError::InvalidPhone(e.to_string()))?;
    let code = AccountCode::parse(code).map_err(|e| UserError::InvalidCode(e.to_string()))?;

    let password = read_password()?;
    let password_hash = auth::hash_password(&password).map_err(|_| UserError::PasswordHash)?;

    let database_url = std::env::var("DUKA_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| UserError::MissingEnvVar("DUKA_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Creating user: {} ({})", username, email);

    let (user, customer) = UserRepository::new(&pool)
        .create_with_customer(username, email, &password_hash, &phone, &code)
        .await?;

    tracing::info!("User created successfully!");
    tracing::info!("  User ID: {}", user.id);
    tracing::info!("  Username: {}", user.username);
    tracing::info!("  Customer ID: {}", customer.id);
    tracing::info!("  Phone: {}", customer.phone);
    tracing::info!("  Code: {}", customer.code);

    Ok(())
}

/// Prompt for a password twice on the controlling terminal.
#[allow(clippy::print_stderr)]
fn read_password() -> Result<String, UserError> {
    let password = prompt("Password: ")?;

    if password.len() < 8 || password.chars().all(|c| c.is_ascii_digit()) {
        return Err(UserError::WeakPassword);
    }

    let confirm = prompt("Confirm password: ")?;
    if password != confirm {
        return Err(UserError::PasswordMismatch);
    }

    Ok(password)
}

#[allow(clippy::print_stderr)]
fn prompt(label: &str) -> Result<String, UserError> {
    eprint!("{label}");
    std::io::stderr().flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;

    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}
