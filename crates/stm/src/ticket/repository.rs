//! Ticket repository for database operations.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::models::{NewTicket, Ticket, TicketListing};
use crate::auth::TicketScope;

const TICKET_COLUMNS: &str =
    "id, title, description, status, priority, created_by, assigned_to, created_at";

/// Repository for ticket database operations.
#[derive(Debug, Clone)]
pub struct TicketRepository {
    pool: SqlitePool,
}

impl TicketRepository {
    /// Create a new ticket repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List tickets in `scope`, newest first, with the creator's name.
    #[instrument(skip(self))]
    pub async fn list(&self, scope: TicketScope) -> Result<Vec<TicketListing>> {
        let base = r#"
            SELECT t.id, t.title, t.description, t.status, t.priority,
                   t.created_by, t.assigned_to, t.created_at,
                   u.name AS creator_name
            FROM tickets t
            LEFT JOIN users u ON u.id = t.created_by
        "#;
        let order = "ORDER BY t.created_at DESC, t.id DESC";

        let tickets = match scope {
            TicketScope::All => {
                sqlx::query_as::<_, TicketListing>(&format!("{base} {order}"))
                    .fetch_all(&self.pool)
                    .await
            }
            TicketScope::CreatedBy(user_id) => {
                sqlx::query_as::<_, TicketListing>(&format!(
                    "{base} WHERE t.created_by = ? {order}"
                ))
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
            }
        }
        .context("Failed to list tickets")?;

        Ok(tickets)
    }

    /// Get a ticket by ID.
    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<Option<Ticket>> {
        sqlx::query_as::<_, Ticket>(&format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch ticket")
    }

    /// Insert a ticket.
    #[instrument(skip(self, ticket), fields(created_by = ticket.created_by))]
    pub async fn create(&self, ticket: NewTicket) -> Result<Ticket> {
        debug!("Creating ticket: {}", ticket.title);

        sqlx::query_as::<_, Ticket>(&format!(
            r#"
            INSERT INTO tickets (title, description, status, priority, created_by, assigned_to)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING {TICKET_COLUMNS}
            "#
        ))
        .bind(&ticket.title)
        .bind(&ticket.description)
        .bind(&ticket.status)
        .bind(&ticket.priority)
        .bind(ticket.created_by)
        .bind(ticket.assigned_to)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert ticket")
    }

    /// Set the assignee. `None` when the ticket does not exist.
    #[instrument(skip(self))]
    pub async fn assign(&self, id: i64, assigned_to: i64) -> Result<Option<Ticket>> {
        sqlx::query_as::<_, Ticket>(&format!(
            "UPDATE tickets SET assigned_to = ? WHERE id = ? RETURNING {TICKET_COLUMNS}"
        ))
        .bind(assigned_to)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to assign ticket")
    }

    /// Set the status. `None` when the ticket does not exist.
    #[instrument(skip(self))]
    pub async fn set_status(&self, id: i64, status: &str) -> Result<Option<Ticket>> {
        sqlx::query_as::<_, Ticket>(&format!(
            "UPDATE tickets SET status = ? WHERE id = ? RETURNING {TICKET_COLUMNS}"
        ))
        .bind(status)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update ticket status")
    }

    /// Delete a ticket and, by cascade, its comments.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tickets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete ticket")?;

        Ok(result.rows_affected() > 0)
    }
}
