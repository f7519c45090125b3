//! Customer repository for database operations.
//!
//! Every read and write is scoped to an [`OwnerScope`]; a customer belonging
//! to a different principal is indistinguishable from one that doesn't exist.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use duka_core::{AccountCode, CustomerId, Phone, UserId};

use super::{OwnerScope, RepositoryError, map_unique_violation};
use crate::models::Customer;

/// Internal row type for `PostgreSQL` customer queries.
#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: i32,
    user_id: i32,
    phone: String,
    code: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepositoryError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let phone = Phone::parse(&row.phone).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid phone in database: {e}"))
        })?;
        let code = AccountCode::parse(&row.code).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid account code in database: {e}"))
        })?;

        Ok(Self {
            id: CustomerId::new(row.id),
            user_id: UserId::new(row.user_id),
            phone,
            code,
            created_at: row.created_at,
        })
    }
}

/// Insert a customer row inside an existing transaction.
///
/// Used by registration so the user and customer inserts commit together.
pub(super) async fn insert_customer(
    tx: &mut Transaction<'_, Postgres>,
    user_id: UserId,
    phone: &Phone,
    code: &AccountCode,
) -> Result<Customer, RepositoryError> {
    let row = sqlx::query_as::<_, CustomerRow>(
        r"
        INSERT INTO customers (user_id, phone, code)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, phone, code, created_at
        ",
    )
    .bind(user_id.as_i32())
    .bind(phone.as_str())
    .bind(code.as_str())
    .fetch_one(&mut **tx)
    .await
    .map_err(map_unique_violation)?;

    row.try_into()
}

/// Repository for customer database operations.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a customer profile for the scoped principal.
    ///
    /// Used when an account predates its profile; registration normally
    /// creates both together.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the principal already has a
    /// profile or the code is in use.
    pub async fn create(
        &self,
        scope: OwnerScope,
        phone: &Phone,
        code: &AccountCode,
    ) -> Result<Customer, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let customer = insert_customer(&mut tx, scope.user_id(), phone, code).await?;
        tx.commit().await?;
        Ok(customer)
    }

    /// Get the scoped principal's customer profile, if one exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_by_owner(&self, scope: OwnerScope) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            SELECT id, user_id, phone, code, created_at
            FROM customers
            WHERE user_id = $1
            ",
        )
        .bind(scope.user_id().as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List the customers visible to the scoped principal (zero or one).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn list(&self, scope: OwnerScope) -> Result<Vec<Customer>, RepositoryError> {
        Ok(self.get_by_owner(scope).await?.into_iter().collect())
    }

    /// Get a customer by ID, scoped to its owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer doesn't exist or
    /// belongs to a different principal.
    pub async fn get(
        &self,
        scope: OwnerScope,
        id: CustomerId,
    ) -> Result<Customer, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            SELECT id, user_id, phone, code, created_at
            FROM customers
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(id.as_i32())
        .bind(scope.user_id().as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Update a customer's phone and/or code, scoped to its owner.
    ///
    /// `user_id` linkage is immutable; only contact fields change.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer doesn't exist or
    /// belongs to a different principal.
    /// Returns `RepositoryError::Conflict` if the new code is in use.
    pub async fn update(
        &self,
        scope: OwnerScope,
        id: CustomerId,
        phone: Option<&Phone>,
        code: Option<&AccountCode>,
    ) -> Result<Customer, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            UPDATE customers
            SET phone = COALESCE($3, phone),
                code = COALESCE($4, code)
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, phone, code, created_at
            ",
        )
        .bind(id.as_i32())
        .bind(scope.user_id().as_i32())
        .bind(phone.map(Phone::as_str))
        .bind(code.map(AccountCode::as_str))
        .fetch_optional(self.pool)
        .await
        .map_err(map_unique_violation)?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Delete a customer and all their orders, scoped to the owner.
    ///
    /// The customer owns its orders' lifetime: both deletes run in one
    /// transaction, orders first. There is no FK cascade to lean on.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer doesn't exist or
    /// belongs to a different principal.
    pub async fn delete(&self, scope: OwnerScope, id: CustomerId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Ownership check and row lock in one step.
        let owned: Option<(i32,)> = sqlx::query_as(
            "SELECT id FROM customers WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(id.as_i32())
        .bind(scope.user_id().as_i32())
        .fetch_optional(&mut *tx)
        .await?;

        if owned.is_none() {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query("DELETE FROM orders WHERE customer_id = $1")
            .bind(id.as_i32())
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id.as_i32())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Check whether an account code is already in use.
    ///
    /// Advisory only: the `customers_code_key` constraint is the race-safe
    /// guarantee.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn code_exists(&self, code: &AccountCode) -> Result<bool, RepositoryError> {
        let row: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM customers WHERE code = $1")
            .bind(code.as_str())
            .fetch_optional(self.pool)
            .await?;

        Ok(row.is_some())
    }
}
