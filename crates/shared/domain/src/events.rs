//! Domain events published on the in-process event router.
//!
//! Each event is its own type so handlers are keyed by event type, not by name.

use crate::ids::{CourseId, OrderId, UserId};
use crate::roles::RoleSet;
use serde::{Deserialize, Serialize};

/// A user asked for a password reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordReset {
    pub user_id: UserId,
}

/// An order moved to the `completed` status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCompleted {
    pub order_id: OrderId,
}

/// An order moved to the `on-hold` status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderOnHold {
    pub order_id: OrderId,
}

/// An order moved to the `cancelled` status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelled {
    pub order_id: OrderId,
}

/// An order was persisted. `created` is `true` only for the first save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSaved {
    pub order_id: OrderId,
    pub created: bool,
}

/// A new user account exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRegistered {
    pub user_id: UserId,
    pub roles: RoleSet,
}

/// A course was deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseDeleted {
    pub course_id: CourseId,
}

/// Fired right before cache-plugin compatibilities are initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheCompatibilitiesRegistering;

/// Fired after cache-plugin compatibilities were initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheCompatibilitiesRegistered {
    pub count: usize,
}
