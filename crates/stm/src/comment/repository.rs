//! Comment repository for database operations.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::instrument;

use super::models::{Comment, CommentWithAuthor};

const COMMENT_COLUMNS: &str = "id, ticket_id, user_id, comment, created_at";

/// Repository for comment database operations.
#[derive(Debug, Clone)]
pub struct CommentRepository {
    pool: SqlitePool,
}

impl CommentRepository {
    /// Create a new comment repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Add a comment to a ticket.
    #[instrument(skip(self, comment))]
    pub async fn add(&self, ticket_id: i64, user_id: i64, comment: &str) -> Result<Comment> {
        sqlx::query_as::<_, Comment>(&format!(
            "INSERT INTO ticket_comments (ticket_id, user_id, comment) VALUES (?, ?, ?) RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(ticket_id)
        .bind(user_id)
        .bind(comment)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert comment")
    }

    /// Comments on one ticket, oldest first, with author names.
    #[instrument(skip(self))]
    pub async fn list_for_ticket(&self, ticket_id: i64) -> Result<Vec<CommentWithAuthor>> {
        sqlx::query_as::<_, CommentWithAuthor>(
            r#"
            SELECT c.id, c.ticket_id, c.user_id, c.comment, c.created_at,
                   u.name AS user_name
            FROM ticket_comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.ticket_id = ?
            ORDER BY c.created_at ASC, c.id ASC
            "#,
        )
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list ticket comments")
    }

    /// Every comment in the system.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Comment>> {
        sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM ticket_comments ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list comments")
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<Option<Comment>> {
        sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM ticket_comments WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch comment")
    }

    /// Replace a comment's text. `None` when it no longer exists.
    #[instrument(skip(self, comment))]
    pub async fn update(&self, id: i64, comment: &str) -> Result<Option<Comment>> {
        sqlx::query_as::<_, Comment>(&format!(
            "UPDATE ticket_comments SET comment = ? WHERE id = ? RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(comment)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update comment")
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM ticket_comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete comment")?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::role::RoleRepository;
    use crate::ticket::{NewTicket, TicketRepository};
    use crate::user::UserRepository;

    #[tokio::test]
    async fn test_comment_lifecycle_and_cascade() {
        let db = Database::in_memory().await.unwrap();
        let roles = RoleRepository::new(db.pool().clone());
        roles.seed_defaults().await.unwrap();
        let role = roles.get_by_name("USER").await.unwrap().unwrap();
        let author = UserRepository::new(db.pool().clone())
            .create("Kim", "kim@example.com", "h", role.id)
            .await
            .unwrap();

        let tickets = TicketRepository::new(db.pool().clone());
        let ticket = tickets
            .create(NewTicket {
                title: "t".to_string(),
                description: None,
                status: "open".to_string(),
                priority: "medium".to_string(),
                created_by: author.id,
                assigned_to: None,
            })
            .await
            .unwrap();

        let comments = CommentRepository::new(db.pool().clone());
        let first = comments.add(ticket.id, author.id, "first").await.unwrap();
        let second = comments.add(ticket.id, author.id, "second").await.unwrap();

        let listed = comments.list_for_ticket(ticket.id).await.unwrap();
        let ids: Vec<i64> = listed.iter().map(|c| c.comment.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert_eq!(listed[0].user_name, "Kim");

        let edited = comments.update(first.id, "edited").await.unwrap().unwrap();
        assert_eq!(edited.comment, "edited");

        assert!(comments.delete(second.id).await.unwrap());
        assert_eq!(comments.list_all().await.unwrap().len(), 1);

        tickets.delete(ticket.id).await.unwrap();
        assert!(comments.get(first.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_comment_on_missing_ticket_fails() {
        let db = Database::in_memory().await.unwrap();
        let comments = CommentRepository::new(db.pool().clone());
        assert!(comments.add(1, 1, "orphan").await.is_err());
    }
}
