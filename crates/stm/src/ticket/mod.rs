//! Tickets and their storage.

mod models;
mod repository;

pub use models::{AssignRequest, CreateTicketRequest, NewTicket, StatusRequest, Ticket, TicketListing};
pub use repository::TicketRepository;
