use crate::constants::{ADMINISTRATOR, INSTRUCTOR, STUDENT};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Represents the set of roles held by a user.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
    pub struct RoleSet: u32 {
        const STUDENT = 1 << 0;
        const INSTRUCTOR = 1 << 1;
        const ADMINISTRATOR = 1 << 2;
    }
}

/// A single role, as assigned on account creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Instructor,
    Administrator,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => STUDENT,
            Self::Instructor => INSTRUCTOR,
            Self::Administrator => ADMINISTRATOR,
        }
    }
}

impl From<Role> for RoleSet {
    fn from(role: Role) -> Self {
        match role {
            Role::Student => Self::STUDENT,
            Role::Instructor => Self::INSTRUCTOR,
            Role::Administrator => Self::ADMINISTRATOR,
        }
    }
}

impl RoleSet {
    /// Returns `true` if the set holds `role`.
    #[must_use]
    pub fn has_role(self, role: Role) -> bool {
        self.contains(role.into())
    }
}
