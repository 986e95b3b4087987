//! HTTP API.

mod envelope;
mod error;
mod extract;
pub mod handlers;
mod routes;
mod state;

pub use envelope::{ApiResponse, Envelope, Outcome};
pub use error::{ApiError, ApiResult};
pub use extract::{ApiJson, ResourceId};
pub use routes::create_router;
pub use state::AppState;
