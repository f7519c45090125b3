//! SMS delivery status for orders.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Terminal (or initial) state of an order's SMS receipt.
///
/// An order starts as [`SmsStatus::Pending`] when the row is written and
/// moves to exactly one of the other states once the notifier reports back.
/// A notifier failure never fails the order; it is only recorded here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SmsStatus {
    /// Order persisted, notifier not yet contacted (or still in flight).
    #[default]
    Pending,
    /// Provider accepted the message.
    Success,
    /// Provider rejected the message, or the transport failed.
    Failed,
    /// Notifications are mocked by configuration; nothing was sent.
    Mocked,
}

impl SmsStatus {
    /// Returns the status as its stored string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Mocked => "mocked",
        }
    }

    /// Parse a status from its stored string form.
    ///
    /// Returns `None` for unknown values.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "success" => Some(Self::Success),
            "failed" => Some(Self::Failed),
            "mocked" => Some(Self::Mocked),
            _ => None,
        }
    }

    /// Whether the notifier has reported back for this order.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for SmsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
