//! Order repository for database operations.
//!
//! Orders are reached through their owning customer: scoped queries join on
//! `customers.user_id` so a principal can only ever see their own orders.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use duka_core::{CustomerId, OrderId, SmsStatus};

use super::{OwnerScope, RepositoryError};
use crate::models::Order;

/// Internal row type for `PostgreSQL` order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    customer_id: i32,
    item: String,
    amount: Decimal,
    created_at: DateTime<Utc>,
    sms_status: String,
    sms_response: Option<serde_json::Value>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let sms_status = SmsStatus::parse(&row.sms_status).ok_or_else(|| {
            RepositoryError::DataCorruption(format!(
                "invalid sms_status in database: {}",
                row.sms_status
            ))
        })?;

        Ok(Self {
            id: OrderId::new(row.id),
            customer_id: CustomerId::new(row.customer_id),
            item: row.item,
            amount: row.amount,
            created_at: row.created_at,
            sms_status,
            sms_response: row.sms_response,
        })
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a new order for a customer.
    ///
    /// This is the durability boundary of order placement: once this
    /// returns, the order exists regardless of what the notifier does.
    /// `sms_status` starts as `pending`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails (including
    /// the `amount > 0` check constraint).
    pub async fn create(
        &self,
        customer_id: CustomerId,
        item: &str,
        amount: Decimal,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO orders (customer_id, item, amount)
            VALUES ($1, $2, $3)
            RETURNING id, customer_id, item, amount, created_at, sms_status, sms_response
            ",
        )
        .bind(customer_id.as_i32())
        .bind(item)
        .bind(amount)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// List the scoped principal's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn list(&self, scope: OwnerScope) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT o.id, o.customer_id, o.item, o.amount, o.created_at,
                   o.sms_status, o.sms_response
            FROM orders o
            JOIN customers c ON o.customer_id = c.id
            WHERE c.user_id = $1
            ORDER BY o.created_at DESC
            ",
        )
        .bind(scope.user_id().as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get an order by ID, scoped to its transitive owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist or
    /// belongs to a different principal.
    pub async fn get(&self, scope: OwnerScope, id: OrderId) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT o.id, o.customer_id, o.item, o.amount, o.created_at,
                   o.sms_status, o.sms_response
            FROM orders o
            JOIN customers c ON o.customer_id = c.id
            WHERE o.id = $1 AND c.user_id = $2
            ",
        )
        .bind(id.as_i32())
        .bind(scope.user_id().as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Update an order's item and/or amount, scoped to its owner.
    ///
    /// `created_at` and the SMS fields are never touched by edits.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist or
    /// belongs to a different principal.
    pub async fn update(
        &self,
        scope: OwnerScope,
        id: OrderId,
        item: Option<&str>,
        amount: Option<Decimal>,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            UPDATE orders o
            SET item = COALESCE($3, o.item),
                amount = COALESCE($4, o.amount)
            FROM customers c
            WHERE o.id = $1 AND o.customer_id = c.id AND c.user_id = $2
            RETURNING o.id, o.customer_id, o.item, o.amount, o.created_at,
                      o.sms_status, o.sms_response
            ",
        )
        .bind(id.as_i32())
        .bind(scope.user_id().as_i32())
        .bind(item)
        .bind(amount)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Delete an order, scoped to its owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist or
    /// belongs to a different principal.
    pub async fn delete(&self, scope: OwnerScope, id: OrderId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM orders o
            USING customers c
            WHERE o.id = $1 AND o.customer_id = c.id AND c.user_id = $2
            ",
        )
        .bind(id.as_i32())
        .bind(scope.user_id().as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Record the notifier's outcome on an order.
    ///
    /// Called once by the order service after dispatch; keyed by raw order
    /// ID because the service holds the order it just persisted. Only the
    /// SMS fields are written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order has vanished.
    pub async fn record_sms_outcome(
        &self,
        id: OrderId,
        status: SmsStatus,
        response: Option<&serde_json::Value>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE orders
            SET sms_status = $2, sms_response = $3
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .bind(status.as_str())
        .bind(response)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
