//! Token service and authentication middleware.

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use log::{debug, warn};
use std::convert::Infallible;
use std::sync::Arc;

use super::{AuthConfig, AuthError, Claims, Role};

/// Extract a Bearer token from an Authorization header value.
fn bearer_token_from_header(header_value: &str) -> Result<&str, AuthError> {
    let mut parts = header_value.split_whitespace();
    let scheme = parts.next().ok_or(AuthError::InvalidAuthHeader)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidAuthHeader);
    }

    let token = parts.next().ok_or(AuthError::InvalidAuthHeader)?;
    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }

    if parts.next().is_some() {
        return Err(AuthError::InvalidAuthHeader);
    }

    Ok(token)
}

/// Authentication state shared across handlers.
///
/// Holds the signing keys derived from the configured secret. Built once at
/// startup and read-only afterwards.
#[derive(Clone)]
pub struct AuthState {
    config: Arc<AuthConfig>,
    encoding_key: Option<EncodingKey>,
    decoding_key: Option<DecodingKey>,
}

impl AuthState {
    /// Create new auth state from config.
    /// Resolves `env:VAR_NAME` syntax in jwt_secret at construction time.
    pub fn new(mut config: AuthConfig) -> Self {
        config.jwt_secret = match config.resolve_jwt_secret() {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!("JWT secret could not be resolved: {}", e);
                None
            }
        };

        let encoding_key = config
            .jwt_secret
            .as_ref()
            .map(|s| EncodingKey::from_secret(s.as_bytes()));
        let decoding_key = config
            .jwt_secret
            .as_ref()
            .map(|s| DecodingKey::from_secret(s.as_bytes()));

        Self {
            config: Arc::new(config),
            encoding_key,
            decoding_key,
        }
    }

    /// Whether role create/update/delete require a manager token.
    pub fn protect_role_writes(&self) -> bool {
        self.config.protect_role_writes
    }

    /// bcrypt work factor for new password hashes.
    pub fn bcrypt_cost(&self) -> u32 {
        self.config.bcrypt_cost
    }

    /// Get allowed CORS origins from config.
    pub fn allowed_origins(&self) -> &[String] {
        &self.config.allowed_origins
    }

    /// Issue a signed token for a user, valid for the configured lifetime.
    pub fn issue_token(&self, user_id: i64, email: &str, role: &str) -> Result<String, AuthError> {
        let key = self
            .encoding_key
            .as_ref()
            .ok_or_else(|| AuthError::Internal("no JWT secret configured".to_string()))?;

        let now = Utc::now().timestamp();
        let claims = Claims {
            id: user_id,
            email: email.to_string(),
            role: role.to_string(),
            iat: now,
            exp: now + self.config.token_ttl_secs,
        };

        encode(&Header::new(Algorithm::HS256), &claims, key)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Verify a token's signature, payload and expiry.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let key = self
            .decoding_key
            .as_ref()
            .ok_or_else(|| AuthError::Internal("no JWT secret configured".to_string()))?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, key, &validation).map_err(|e| {
            warn!("JWT validation failed: {:?}", e);
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidSignature => {
                    AuthError::InvalidToken("invalid signature".to_string())
                }
                ErrorKind::InvalidToken
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_) => AuthError::InvalidToken("jwt malformed".to_string()),
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }
}

/// Authenticated user extracted from request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// User claims.
    pub claims: Claims,
}

impl CurrentUser {
    /// Get the user ID.
    pub fn id(&self) -> i64 {
        self.claims.id
    }

    /// Get the user's role.
    pub fn role(&self) -> Role {
        self.claims.effective_role()
    }
}

/// Extract authentication from request.
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AuthError::MissingAuthHeader)
    }
}

/// Authentication if the gate ran on this route, `None` otherwise.
impl<S> OptionalFromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<CurrentUser>().cloned())
    }
}

/// Authentication middleware.
///
/// Validates the `Authorization: Bearer <token>` header and injects
/// `CurrentUser` into request extensions.
pub async fn auth_middleware(
    State(auth): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?;

    let header = header.to_str().map_err(|_| AuthError::InvalidAuthHeader)?;
    let token = bearer_token_from_header(header)?;
    let claims = auth.verify_token(token)?;

    debug!("Authenticated user {} ({})", claims.id, claims.role);

    req.extensions_mut().insert(CurrentUser { claims });

    Ok(next.run(req).await)
}

#[cfg(test)]
#[allow(clippy::field_reassign_with_default)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-for-unit-tests-minimum-32-chars-long";

    fn test_state() -> AuthState {
        let mut config = AuthConfig::default();
        config.jwt_secret = Some(SECRET.to_string());
        AuthState::new(config)
    }

    #[test]
    fn test_bearer_token_from_header_valid() {
        assert_eq!(
            bearer_token_from_header("Bearer abc.def.ghi").unwrap(),
            "abc.def.ghi"
        );
        assert_eq!(
            bearer_token_from_header("bearer   token123").unwrap(),
            "token123"
        );
    }

    #[test]
    fn test_bearer_token_from_header_invalid() {
        let cases = ["", "Bearer", "Bearer ", "Token something", "Bearer token extra"];

        for case in cases {
            assert!(
                bearer_token_from_header(case).is_err(),
                "{case} should fail"
            );
        }
    }

    #[test]
    fn test_issue_and_verify_token() {
        let state = test_state();
        let token = state.issue_token(42, "ana@example.com", "SUPPORT").unwrap();

        let claims = state.verify_token(&token).unwrap();
        assert_eq!(claims.id, 42);
        assert_eq!(claims.email, "ana@example.com");
        assert_eq!(claims.role, "SUPPORT");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let state = test_state();
        let now = Utc::now().timestamp();
        let claims = Claims {
            id: 1,
            email: "old@example.com".to_string(),
            role: "USER".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            state.verify_token(&token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let mut other = AuthConfig::default();
        other.jwt_secret = Some("another-secret-that-is-also-32-chars-or-more".to_string());
        let token = AuthState::new(other)
            .issue_token(1, "x@example.com", "MANAGER")
            .unwrap();

        let err = test_state().verify_token(&token).unwrap_err();
        assert_eq!(err.to_string(), "invalid signature");
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        let err = test_state().verify_token("not-a-jwt").unwrap_err();
        assert_eq!(err.to_string(), "jwt malformed");
    }

    #[test]
    fn test_missing_secret_is_internal_error() {
        let mut config = AuthConfig::default();
        config.jwt_secret = None;
        let state = AuthState::new(config);

        assert!(matches!(
            state.issue_token(1, "x@example.com", "USER"),
            Err(AuthError::Internal(_))
        ));
    }

    #[test]
    fn test_current_user() {
        let user = CurrentUser {
            claims: Claims {
                id: 3,
                email: "m@example.com".to_string(),
                role: "manager".to_string(),
                iat: 0,
                exp: 0,
            },
        };
        assert_eq!(user.id(), 3);
        assert_eq!(user.role(), Role::Manager);
    }
}
