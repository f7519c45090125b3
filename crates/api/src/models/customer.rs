//! Customer profile model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use duka_core::{AccountCode, CustomerId, Phone, UserId};

/// One identity's commerce profile.
///
/// Exactly one customer exists per user (`user_id` is unique), created at
/// registration and removed only when the owning user is deleted. The
/// customer in turn owns its orders: deleting a customer deletes its orders
/// in the same transaction.
#[derive(Debug, Clone, Serialize)]
pub struct Customer {
    /// Unique customer ID
    pub id: CustomerId,
    /// Owning user (1:1, immutable after creation)
    pub user_id: UserId,
    /// Contact phone number for SMS receipts
    pub phone: Phone,
    /// Globally unique external-facing account code
    pub code: AccountCode,
    /// When the profile was created
    pub created_at: DateTime<Utc>,
}
