//! User (identity) model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use duka_core::UserId;

/// An authenticated identity.
///
/// Users hold the credential (username + password hash); commerce data lives
/// on the linked [`Customer`](crate::models::Customer). The password hash is
/// never part of this struct so it cannot leak through serialization.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user ID
    pub id: UserId,
    /// Unique login handle
    pub username: String,
    /// Contact email address
    pub email: String,
    /// When the user registered
    pub created_at: DateTime<Utc>,
}
