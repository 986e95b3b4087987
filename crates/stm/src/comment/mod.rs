//! Ticket comments.

mod models;
mod repository;

pub use models::{Comment, CommentRequest, CommentWithAuthor};
pub use repository::CommentRepository;
