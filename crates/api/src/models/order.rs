//! Order model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use duka_core::{CustomerId, OrderId, SmsStatus};

/// One purchase record belonging to exactly one customer.
///
/// `created_at` is server-assigned and immutable. `sms_status` and
/// `sms_response` are written once by the notifier dispatch after the row is
/// persisted; order edits never touch them.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    /// Unique order ID
    pub id: OrderId,
    /// Owning customer
    pub customer_id: CustomerId,
    /// What was ordered (non-empty, at most 100 chars)
    pub item: String,
    /// Positive amount in KSh, 2-decimal precision
    pub amount: Decimal,
    /// Server-assigned creation timestamp
    pub created_at: DateTime<Utc>,
    /// SMS receipt delivery state
    pub sms_status: SmsStatus,
    /// Raw notifier payload, if the notifier has reported back
    pub sms_response: Option<serde_json::Value>,
}
