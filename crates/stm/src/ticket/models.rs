//! Ticket data models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::auth::Relation;

/// Status given to tickets created without one.
pub const DEFAULT_STATUS: &str = "open";

/// Priority given to tickets created without one.
pub const DEFAULT_PRIORITY: &str = "medium";

/// Ticket row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    /// Free text; no transition graph is enforced.
    pub status: String,
    pub priority: String,
    pub created_by: i64,
    pub assigned_to: Option<i64>,
    pub created_at: String,
}

impl Ticket {
    /// Ownership facts for the authorization policy.
    pub fn relation(&self) -> Relation {
        Relation::ticket(self.created_by, self.assigned_to)
    }
}

/// Ticket row as it appears in listings.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TicketListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub ticket: Ticket,
    pub creator_name: Option<String>,
}

/// Body of `POST /api/tickets`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTicketRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assigned_to: Option<i64>,
}

impl CreateTicketRequest {
    /// Validate and apply defaults. `None` when the title is missing or blank.
    pub fn into_new_ticket(self, created_by: i64) -> Option<NewTicket> {
        let title = self.title.filter(|t| !t.trim().is_empty())?;
        Some(NewTicket {
            title,
            description: self.description,
            status: self
                .status
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            priority: self
                .priority
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PRIORITY.to_string()),
            created_by,
            assigned_to: self.assigned_to,
        })
    }
}

/// A validated ticket ready for insertion.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub created_by: i64,
    pub assigned_to: Option<i64>,
}

/// Body of `PATCH /api/tickets/{id}/assign`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssignRequest {
    pub assigned_to: Option<i64>,
}

/// Body of `PATCH /api/tickets/{id}/status`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusRequest {
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ticket_defaults() {
        let request = CreateTicketRequest {
            title: Some("Printer on fire".to_string()),
            ..Default::default()
        };
        let ticket = request.into_new_ticket(5).unwrap();
        assert_eq!(ticket.status, "open");
        assert_eq!(ticket.priority, "medium");
        assert_eq!(ticket.created_by, 5);
        assert_eq!(ticket.assigned_to, None);
    }

    #[test]
    fn test_new_ticket_keeps_given_values() {
        let request = CreateTicketRequest {
            title: Some("VPN down".to_string()),
            description: Some("since 9am".to_string()),
            status: Some("in_progress".to_string()),
            priority: Some("high".to_string()),
            assigned_to: Some(2),
        };
        let ticket = request.into_new_ticket(1).unwrap();
        assert_eq!(ticket.status, "in_progress");
        assert_eq!(ticket.priority, "high");
        assert_eq!(ticket.assigned_to, Some(2));
    }

    #[test]
    fn test_new_ticket_requires_title() {
        assert!(CreateTicketRequest::default().into_new_ticket(1).is_none());
        let blank = CreateTicketRequest {
            title: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(blank.into_new_ticket(1).is_none());
    }

    #[test]
    fn test_listing_serializes_flat() {
        let listing = TicketListing {
            ticket: Ticket {
                id: 1,
                title: "t".to_string(),
                description: None,
                status: "open".to_string(),
                priority: "low".to_string(),
                created_by: 3,
                assigned_to: None,
                created_at: "now".to_string(),
            },
            creator_name: Some("Ana".to_string()),
        };
        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["creator_name"], "Ana");
        assert!(json.get("ticket").is_none());
    }
}
