//! JWT claims and user roles.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// User role.
///
/// Role rows are free text in the store; only these three names carry
/// privileges. Anything else is treated as [`Role::User`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Sees and manages everything.
    Manager,
    /// Works tickets assigned to them.
    Support,
    /// Files and follows their own tickets.
    #[default]
    User,
}

impl Role {
    /// Every role, in seeding order.
    pub const ALL: [Role; 3] = [Role::Manager, Role::Support, Role::User];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Manager => "MANAGER",
            Role::Support => "SUPPORT",
            Role::User => "USER",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "MANAGER" => Ok(Role::Manager),
            "SUPPORT" => Ok(Role::Support),
            "USER" => Ok(Role::User),
            _ => Err(format!("unknown role: {}", s)),
        }
    }
}

/// JWT claims structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub id: i64,

    /// User's email.
    pub email: String,

    /// Role name as stored in the roles table.
    pub role: String,

    /// Issued at (as Unix timestamp).
    #[serde(default)]
    pub iat: i64,

    /// Expiration time (as Unix timestamp).
    pub exp: i64,
}

impl Claims {
    /// Get the effective role for the user.
    pub fn effective_role(&self) -> Role {
        self.role.parse().unwrap_or_else(|_| {
            warn!(
                user_id = self.id,
                role = %self.role,
                "unrecognised role name, falling back to USER"
            );
            Role::User
        })
    }
}
