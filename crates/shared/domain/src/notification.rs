use crate::constants::SCHEDULE_HANDLE_PREFIX;
use crate::ids::{OrderId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Every notification the platform can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    OrderCompleted,
    OrderOnHold,
    OrderCancelled,
    NewOrder,
    StudentRegistered,
    InstructorRegistered,
    PasswordReset,
}

impl NotificationKind {
    pub const ALL: [Self; 7] = [
        Self::OrderCompleted,
        Self::OrderOnHold,
        Self::OrderCancelled,
        Self::NewOrder,
        Self::StudentRegistered,
        Self::InstructorRegistered,
        Self::PasswordReset,
    ];

    /// Stable snake_case identifier, identical to the serde representation.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::OrderCompleted => "order_completed",
            Self::OrderOnHold => "order_on_hold",
            Self::OrderCancelled => "order_cancelled",
            Self::NewOrder => "new_order",
            Self::StudentRegistered => "student_registered",
            Self::InstructorRegistered => "instructor_registered",
            Self::PasswordReset => "password_reset",
        }
    }

    /// Handle the deferred queue uses to find the job runner later.
    #[must_use]
    pub fn schedule_handle(self) -> String {
        format!("{SCHEDULE_HANDLE_PREFIX}/{}", self.id())
    }

    /// Reverse of [`NotificationKind::schedule_handle`].
    #[must_use]
    pub fn from_schedule_handle(handle: &str) -> Option<Self> {
        let id = handle.strip_prefix(SCHEDULE_HANDLE_PREFIX)?.strip_prefix('/')?;
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }

    /// `true` for kinds whose subject is an order.
    #[must_use]
    pub const fn is_order_kind(self) -> bool {
        matches!(self, Self::OrderCompleted | Self::OrderOnHold | Self::OrderCancelled | Self::NewOrder)
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// The entity a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Subject {
    Order(OrderId),
    User(UserId),
}

impl Subject {
    /// Raw numeric identifier, as carried in queue payloads.
    #[must_use]
    pub const fn raw(self) -> u64 {
        match self {
            Self::Order(id) => id.0,
            Self::User(id) => id.0,
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Order(id) => write!(f, "order#{id}"),
            Self::User(id) => write!(f, "user#{id}"),
        }
    }
}

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Error,
}
