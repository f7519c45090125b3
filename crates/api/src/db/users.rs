//! User repository for database operations.
//!
//! Queries use the runtime `query_as` API with typed row structs converted
//! into domain models via `TryFrom`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use duka_core::{AccountCode, Phone, UserId};

use super::{RepositoryError, map_unique_violation};
use crate::models::{Customer, User};

/// Internal row type for `PostgreSQL` user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    username: String,
    email: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::new(row.id),
            username: row.username,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, username, email, created_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Check whether a username is already taken.
    ///
    /// Advisory only: the `users_username_key` constraint is the race-safe
    /// guarantee.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn username_exists(&self, username: &str) -> Result<bool, RepositoryError> {
        let row: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.is_some())
    }

    /// Get a user's password hash by username.
    ///
    /// Returns `None` if the user doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct UserWithHash {
            id: i32,
            username: String,
            email: String,
            created_at: DateTime<Utc>,
            password_hash: String,
        }

        let row = sqlx::query_as::<_, UserWithHash>(
            r"
            SELECT id, username, email, created_at, password_hash
            FROM users
            WHERE username = $1
            ",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| {
            (
                User {
                    id: UserId::new(r.id),
                    username: r.username,
                    email: r.email,
                    created_at: r.created_at,
                },
                r.password_hash,
            )
        }))
    }

    /// Atomically create a user and their customer profile.
    ///
    /// Registration is all-or-nothing: both inserts run in one transaction,
    /// so a duplicate account code detected at the constraint layer rolls the
    /// user back too.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username, account code, or
    /// identity linkage already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_customer(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        phone: &Phone,
        code: &AccountCode,
    ) -> Result<(User, Customer), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let user_row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, created_at
            ",
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        let user: User = user_row.into();

        let customer = super::customers::insert_customer(&mut tx, user.id, phone, code).await?;

        tx.commit().await?;

        Ok((user, customer))
    }
}
