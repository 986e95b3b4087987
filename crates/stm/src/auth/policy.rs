//! Authorization policy.
//!
//! A pure decision function from `(role, caller id, action, relation)` to
//! allow/deny. Handlers follow a fetch, authorize, mutate sequence: they read
//! the row, describe the caller's relation to it with [`Relation`], ask
//! [`authorize`], and only then write. Nothing here touches storage.
//!
//! A row that does not exist is judged with [`Relation::none`]. Ownership
//! rules then deny, so USER and SUPPORT get 403 whether or not the row is
//! there, while MANAGER goes on to a 404.

use std::fmt;

use tracing::info;

use super::Role;

/// Everything a caller can attempt that the policy has an opinion on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// List every user.
    ListUsers,
    /// Create, rename or delete roles (only consulted when role writes are protected).
    ManageRoles,
    /// List tickets (scope decided by [`ticket_scope`]).
    ListTickets,
    /// Read a single ticket.
    ReadTicket,
    /// Open a ticket as the caller.
    CreateTicket,
    /// Change a ticket's assignee.
    AssignTicket,
    /// Change a ticket's status.
    UpdateTicketStatus,
    /// Delete a ticket.
    DeleteTicket,
    /// Add a comment to, or read the comments of, a ticket.
    CommentOnTicket,
    /// List every comment in the system.
    ListComments,
    /// Edit or delete a single comment.
    EditComment,
}

impl Action {
    /// Message returned to a caller who is denied this action.
    pub fn denial_message(&self) -> &'static str {
        match self {
            Action::ListUsers => "Access denied. Only manager can view user list.",
            Action::ListComments => "Access denied. Only manager can view all comments.",
            Action::DeleteTicket => "Only manager can delete tickets",
            Action::ManageRoles => "Access denied. Only manager can manage roles.",
            _ => "Access denied",
        }
    }
}

/// The caller-independent ownership facts of a freshly read row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Relation {
    /// Ticket creator.
    pub created_by: Option<i64>,
    /// Ticket assignee.
    pub assigned_to: Option<i64>,
    /// Comment author.
    pub author: Option<i64>,
}

impl Relation {
    /// No row involved (list/create style actions).
    pub fn none() -> Self {
        Self::default()
    }

    pub fn ticket(created_by: i64, assigned_to: Option<i64>) -> Self {
        Self {
            created_by: Some(created_by),
            assigned_to,
            author: None,
        }
    }

    pub fn comment(author: i64) -> Self {
        Self {
            author: Some(author),
            ..Self::default()
        }
    }
}

/// Decide whether `role`/`user_id` may perform `action` on a row with `relation`.
pub fn can(role: Role, user_id: i64, action: Action, relation: &Relation) -> bool {
    use Action::*;

    match action {
        ListUsers | ListComments | DeleteTicket | ManageRoles => role == Role::Manager,
        ListTickets | CreateTicket => true,
        AssignTicket | UpdateTicketStatus => matches!(role, Role::Manager | Role::Support),
        ReadTicket | CommentOnTicket => match role {
            Role::Manager => true,
            Role::Support => relation.assigned_to == Some(user_id),
            Role::User => relation.created_by == Some(user_id),
        },
        EditComment => role == Role::Manager || relation.author == Some(user_id),
    }
}

/// Which tickets a listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketScope {
    All,
    CreatedBy(i64),
}

pub fn ticket_scope(role: Role, user_id: i64) -> TicketScope {
    match role {
        Role::Manager | Role::Support => TicketScope::All,
        Role::User => TicketScope::CreatedBy(user_id),
    }
}

/// A denied decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDenied {
    pub action: Action,
}

impl fmt::Display for AccessDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action.denial_message())
    }
}

impl std::error::Error for AccessDenied {}

/// [`can`], logging denials and turning them into an error.
pub fn authorize(
    role: Role,
    user_id: i64,
    action: Action,
    relation: &Relation,
) -> Result<(), AccessDenied> {
    if can(role, user_id, action, relation) {
        return Ok(());
    }

    info!(user_id, role = %role, action = ?action, "access denied");
    Err(AccessDenied { action })
}
