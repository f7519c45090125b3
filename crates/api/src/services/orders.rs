//! Order service: placement, edits, and best-effort SMS dispatch.
//!
//! Order placement and SMS delivery are deliberately decoupled. The insert
//! is the durability boundary - once the row is in, the order is returned to
//! the caller no matter what the notifier does. Coupling them would make a
//! flaky SMS gateway a single point of failure for the primary business
//! transaction.

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;
use tracing::warn;

use duka_core::{OrderId, SmsStatus};

use crate::db::customers::CustomerRepository;
use crate::db::orders::OrderRepository;
use crate::db::{OwnerScope, RepositoryError};
use crate::error::FieldErrors;
use crate::models::Order;
use crate::sms::SmsNotifier;

/// Maximum item description length.
const MAX_ITEM_LENGTH: usize = 100;

/// Largest representable amount (NUMERIC(10,2)).
const MAX_AMOUNT: Decimal = Decimal::from_parts(0x540B_E3FF, 2, 0, false, 2); // 99_999_999.99

/// Errors that can occur in the order service.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Field-level validation failure; nothing was persisted.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// The principal has no customer profile to order against.
    #[error("no customer profile linked to this account")]
    NoProfile,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Order service.
pub struct OrderService<'a> {
    customers: CustomerRepository<'a>,
    orders: OrderRepository<'a>,
    notifier: &'a SmsNotifier,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, notifier: &'a SmsNotifier) -> Self {
        Self {
            customers: CustomerRepository::new(pool),
            orders: OrderRepository::new(pool),
            notifier,
        }
    }

    /// Place an order for the scoped principal and dispatch an SMS receipt.
    ///
    /// Sequence: resolve profile, validate, persist, notify, record. The
    /// notifier runs after the insert and its outcome - success, failure, or
    /// mock - is recorded on the order; it is never surfaced as an error and
    /// never undoes the insert.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NoProfile` if the principal has no customer, or
    /// `OrderError::Validation` before anything is persisted. Notifier
    /// failures are not errors.
    pub async fn place_order(
        &self,
        scope: OwnerScope,
        display_name: &str,
        item: &str,
        amount: Decimal,
    ) -> Result<Order, OrderError> {
        let customer = self
            .customers
            .get_by_owner(scope)
            .await?
            .ok_or(OrderError::NoProfile)?;

        validate_order_fields(Some(item), Some(amount))?;

        // Durability boundary: past this point the order exists and is
        // returned regardless of the notifier.
        let mut order = self.orders.create(customer.id, item, amount).await?;

        let message = format!(
            "Hello {display_name}, your order for {item} (KSh{amount}) has been received."
        );
        let outcome = self.notifier.send(&customer.phone, &message).await;

        if outcome.status == SmsStatus::Failed {
            warn!(
                order_id = %order.id,
                phone = %customer.phone,
                response = ?outcome.response,
                "SMS receipt failed; order stands"
            );
        }

        // The row stays `pending` unless the notifier settled on a terminal
        // state; `pending` always means "no outcome was ever recorded".
        if outcome.status.is_terminal() {
            if let Err(e) = self
                .orders
                .record_sms_outcome(order.id, outcome.status, outcome.response.as_ref())
                .await
            {
                // Recording is itself best-effort: the order is already durable.
                warn!(order_id = %order.id, error = %e, "failed to record SMS outcome");
            }

            order.sms_status = outcome.status;
            order.sms_response = outcome.response;
        }

        Ok(order)
    }

    /// List the principal's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn list(&self, scope: OwnerScope) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.list(scope).await?)
    }

    /// Get one of the principal's orders.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` with `NotFound` if the order doesn't
    /// exist or belongs to someone else.
    pub async fn get(&self, scope: OwnerScope, id: OrderId) -> Result<Order, OrderError> {
        Ok(self.orders.get(scope, id).await?)
    }

    /// Edit an order's item and/or amount.
    ///
    /// SMS fields and `created_at` are untouchable through edits.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Validation` for bad fields, or
    /// `OrderError::Repository` with `NotFound` for missing/unowned orders.
    pub async fn update(
        &self,
        scope: OwnerScope,
        id: OrderId,
        item: Option<&str>,
        amount: Option<Decimal>,
    ) -> Result<Order, OrderError> {
        validate_order_fields(item, amount)?;
        Ok(self.orders.update(scope, id, item, amount).await?)
    }

    /// Delete an order.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` with `NotFound` for missing/unowned
    /// orders.
    pub async fn delete(&self, scope: OwnerScope, id: OrderId) -> Result<(), OrderError> {
        Ok(self.orders.delete(scope, id).await?)
    }
}

/// Validate order fields, accumulating per-field messages.
///
/// `None` means "field not supplied" (partial update) and is skipped.
fn validate_order_fields(item: Option<&str>, amount: Option<Decimal>) -> Result<(), OrderError> {
    let mut errors = FieldErrors::new();

    if let Some(item) = item {
        if item.trim().is_empty() {
            errors.push("item", "item cannot be empty");
        } else if item.len() > MAX_ITEM_LENGTH {
            errors.push(
                "item",
                format!("item must be at most {MAX_ITEM_LENGTH} characters"),
            );
        }
    }

    if let Some(amount) = amount {
        if amount <= Decimal::ZERO {
            errors.push("amount", "amount must be greater than zero");
        } else if amount.scale() > 2 {
            errors.push("amount", "amount must have at most 2 decimal places");
        } else if amount > MAX_AMOUNT {
            errors.push("amount", "amount is too large");
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(OrderError::Validation(errors))
    }
}
