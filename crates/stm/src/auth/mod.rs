//! Authentication and authorization.
//!
//! Provides:
//! - HS256 token issuance and verification
//! - The bearer-token middleware guarding protected routes
//! - The role/ownership policy consulted by every handler

mod claims;
mod config;
mod error;
mod middleware;
pub mod policy;

pub use claims::{Claims, Role};
pub use config::{AuthConfig, ConfigValidationError, DEFAULT_TOKEN_TTL_SECS};
pub use error::AuthError;
pub use middleware::{AuthState, CurrentUser, auth_middleware};
pub use policy::{AccessDenied, Action, Relation, TicketScope, authorize, can, ticket_scope};
