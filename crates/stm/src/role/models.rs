//! Role data models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Role row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RoleRecord {
    pub id: i64,
    pub name: String,
}

/// Body of role create and update requests.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoleRequest {
    pub name: Option<String>,
}
