//! Role management.

mod models;
mod repository;

pub use models::{RoleRecord, RoleRequest};
pub use repository::RoleRepository;
