//! Signed-in user profile and role.
//!
//! The role is only *reflected* by clients (which affordances to show).
//! Whether a write is allowed is decided by the store's access policy.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::ids::UserId;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Role {
    Admin,
    Reviewer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Reviewer => "reviewer",
        }
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "reviewer" => Ok(Role::Reviewer),
            other => Err(CoreError::UnknownRole(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row of the auxiliary `profiles` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: UserId,
    pub email: Option<String>,
    /// `None` when the stored role is missing or not one we know.
    pub role: Option<Role>,
}

impl Profile {
    /// Whether mutation affordances should be shown.
    pub fn shows_admin_controls(&self) -> bool {
        self.role == Some(Role::Admin)
    }
}
