//! Unified API error handling with envelope responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{debug, error};

use super::Envelope;
use crate::auth::{AccessDenied, AuthError};
use crate::db::{ConstraintViolation, constraint_violation};

/// API error type. The display string is the envelope message.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthenticated(String),

    /// Authenticated but not allowed, or token rejected.
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Unique or referential constraint hit. Reported as 400.
    #[error("{0}")]
    Conflict(String),

    /// Unexpected failure; the message carries the full error chain.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Translate a repository error, mapping known constraint violations to
    /// `Conflict` with the given message. Anything else becomes `Internal`.
    pub fn from_store(err: anyhow::Error, conflicts: &[(ConstraintViolation, &str)]) -> Self {
        if let Some(violation) = constraint_violation(&err) {
            if let Some((_, msg)) = conflicts.iter().find(|(v, _)| *v == violation) {
                debug!(?violation, "store constraint violation: {:#}", err);
                return Self::conflict(*msg);
            }
        }
        Self::from(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            ApiError::Internal(msg) => {
                error!(status = status.as_u16(), message = %msg, "API error");
            }
            _ => {
                debug!(status = status.as_u16(), message = %self, "Client error");
            }
        }

        (status, Json(Envelope::failure(self.to_string()))).into_response()
    }
}

/// Unclassified repository and service errors are internal.
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{:#}", err))
    }
}

impl From<AccessDenied> for ApiError {
    fn from(denied: AccessDenied) -> Self {
        Self::Forbidden(denied.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingAuthHeader => Self::Unauthenticated(err.to_string()),
            AuthError::InvalidAuthHeader | AuthError::InvalidToken(_) | AuthError::TokenExpired => {
                Self::Forbidden(err.to_string())
            }
            AuthError::Internal(_) => Self::Internal(err.to_string()),
        }
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Action;
    use crate::db::Database;
    use anyhow::Context;

    #[test]
    fn test_error_response_status_codes() {
        assert_eq!(ApiError::validation("").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::conflict("").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Unauthenticated(String::new()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::forbidden("").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::not_found("").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::internal("").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_anyhow_becomes_internal_with_chain() {
        let err = anyhow::anyhow!("disk I/O error").context("Failed to insert ticket");
        let api_err = ApiError::from(err);
        assert!(matches!(&api_err, ApiError::Internal(_)));
        assert_eq!(api_err.to_string(), "Failed to insert ticket: disk I/O error");
    }

    #[test]
    fn test_access_denied_is_forbidden() {
        let api_err = ApiError::from(AccessDenied {
            action: Action::ListComments,
        });
        assert!(matches!(&api_err, ApiError::Forbidden(_)));
        assert_eq!(
            api_err.to_string(),
            "Access denied. Only manager can view all comments."
        );
    }

    #[test]
    fn test_auth_error_mapping() {
        assert!(matches!(
            ApiError::from(AuthError::MissingAuthHeader),
            ApiError::Unauthenticated(_)
        ));
        assert!(matches!(
            ApiError::from(AuthError::TokenExpired),
            ApiError::Forbidden(_)
        ));
    }

    async fn insert_support(db: &Database) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO roles (name) VALUES ('SUPPORT')")
            .execute(db.pool())
            .await
            .context("Failed to insert role")?;
        Ok(())
    }

    #[tokio::test]
    async fn test_from_store_maps_listed_violations_only() {
        let db = Database::in_memory().await.unwrap();
        insert_support(&db).await.unwrap();

        let err = insert_support(&db).await.unwrap_err();
        let api_err = ApiError::from_store(
            err,
            &[(ConstraintViolation::Unique, "Role already exists")],
        );
        assert!(matches!(&api_err, ApiError::Conflict(msg) if msg == "Role already exists"));

        let err = insert_support(&db).await.unwrap_err();
        let api_err = ApiError::from_store(
            err,
            &[(ConstraintViolation::ForeignKey, "still referenced")],
        );
        assert!(matches!(api_err, ApiError::Internal(_)));
    }
}
