//! Authentication errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::api::Envelope;

/// Authentication errors.
///
/// The display strings are the messages clients see in the envelope.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing authorization header.
    #[error("invalid token")]
    MissingAuthHeader,

    /// Authorization header present but not `Bearer <token>`.
    #[error("jwt must be provided")]
    InvalidAuthHeader,

    /// Token failed signature or payload checks.
    #[error("{0}")]
    InvalidToken(String),

    /// Token expired.
    #[error("jwt expired")]
    TokenExpired,

    /// Internal error.
    #[error("internal auth error: {0}")]
    Internal(String),
}

impl AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader => StatusCode::UNAUTHORIZED,
            AuthError::InvalidAuthHeader
            | AuthError::InvalidToken(_)
            | AuthError::TokenExpired => StatusCode::FORBIDDEN,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Internal(msg) = &self {
            error!(message = %msg, "authentication failure");
        }

        (self.status_code(), Json(Envelope::failure(self.to_string()))).into_response()
    }
}
