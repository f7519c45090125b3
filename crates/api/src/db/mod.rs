//! Database operations for the Duka `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` - Identity store (username + password hash)
//! - `customers` - Commerce profiles, 1:1 with users, globally unique codes
//! - `orders` - Purchase records, owned by customers
//!
//! Every customer/order read and write goes through an [`OwnerScope`]: the
//! repositories cannot be called without saying which principal is asking,
//! and their SQL filters on that principal. Ownership is never re-checked at
//! the route layer.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p duka-cli -- migrate
//! ```

pub mod customers;
pub mod orders;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use duka_core::UserId;

/// Errors that can occur during repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found, or is not owned by the caller.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate account code).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// The authenticated principal a query is scoped to.
///
/// Constructed from the bearer credential by the auth extractor and threaded
/// through every repository call. A query scoped to one principal can only
/// ever see rows transitively owned by that principal; a row owned by anyone
/// else behaves exactly like a missing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerScope {
    user_id: UserId,
}

impl OwnerScope {
    /// Scope queries to the given principal.
    #[must_use]
    pub const fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    /// The principal's user ID.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a unique-constraint violation to a domain conflict message.
///
/// Postgres reports which constraint tripped; this is the single place that
/// knowledge lives. Anything that isn't a unique violation passes through as
/// a plain database error.
fn map_unique_violation(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        let message = match db_err.constraint() {
            Some("users_username_key") => "username already taken",
            Some("customers_user_id_key") => "identity already linked to a customer",
            Some("customers_code_key") => "account code already in use",
            _ => "duplicate value",
        };
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(err)
}
