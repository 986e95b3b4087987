//! Application state shared across handlers.

use std::sync::Arc;

use crate::auth::AuthState;
use crate::comment::CommentRepository;
use crate::db::Database;
use crate::role::RoleRepository;
use crate::ticket::TicketRepository;
use crate::user::{UserRepository, UserService};

/// Application state shared across handlers.
///
/// Built once from the store handle and auth state, then cloned per request.
#[derive(Clone)]
pub struct AppState {
    /// Role repository.
    pub roles: Arc<RoleRepository>,
    /// User service for registration and login.
    pub users: Arc<UserService>,
    /// Ticket repository.
    pub tickets: Arc<TicketRepository>,
    /// Comment repository.
    pub comments: Arc<CommentRepository>,
    /// Authentication state.
    pub auth: AuthState,
}

impl AppState {
    /// Create application state from a database and auth state.
    pub fn new(db: &Database, auth: AuthState) -> Self {
        let pool = db.pool().clone();
        let users = UserService::new(UserRepository::new(pool.clone()), auth.bcrypt_cost());

        Self {
            roles: Arc::new(RoleRepository::new(pool.clone())),
            users: Arc::new(users),
            tickets: Arc::new(TicketRepository::new(pool.clone())),
            comments: Arc::new(CommentRepository::new(pool)),
            auth,
        }
    }
}
