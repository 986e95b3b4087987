//! Comment data models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::auth::Relation;

/// Comment row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub ticket_id: i64,
    /// Author.
    pub user_id: i64,
    pub comment: String,
    pub created_at: String,
}

impl Comment {
    pub fn relation(&self) -> Relation {
        Relation::comment(self.user_id)
    }
}

/// Comment with its author's name, as listed under a ticket.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CommentWithAuthor {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub comment: Comment,
    pub user_name: String,
}

/// Body of comment create and update requests.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentRequest {
    pub comment: Option<String>,
}

impl CommentRequest {
    /// The comment text, if present and not blank.
    pub fn text(self) -> Option<String> {
        self.comment.filter(|c| !c.trim().is_empty())
    }
}
