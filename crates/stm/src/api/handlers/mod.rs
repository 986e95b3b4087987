//! API request handlers, organized by resource:
//! - `roles`: role CRUD
//! - `users`: registration, login, listing
//! - `tickets`: ticket CRUD plus comments on a ticket
//! - `comments`: listing, editing and deleting single comments
//! - `health`: liveness

mod comments;
mod health;
mod roles;
mod tickets;
mod users;

pub use comments::{delete_comment, list_comments, update_comment};
pub use health::{HealthInfo, health};
pub use roles::{create_role, delete_role, get_role, list_roles, update_role};
pub use tickets::{
    add_ticket_comment, assign_ticket, create_ticket, delete_ticket, get_ticket,
    list_ticket_comments, list_tickets, update_ticket_status,
};
pub use users::{LoginResponse, list_users, login, me, register};
