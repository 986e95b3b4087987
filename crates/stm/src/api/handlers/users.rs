//! User handlers: registration, login and listing.

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::ApiJson;
use crate::api::state::AppState;
use crate::api::ApiResponse;
use crate::auth::{Action, CurrentUser, Relation, authorize};
use crate::db::ConstraintViolation;
use crate::user::{LoginRequest, RegisterRequest, User, UserInfo};

/// Login failure message. Unknown email and wrong password are not told apart.
const LOGIN_FAILED: &str = "User Not Found";

/// Login response.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

#[instrument(skip(state, request))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> ApiResult<ApiResponse<User>> {
    let new_user = request
        .into_new_user()
        .ok_or_else(|| ApiError::validation("name, email, password and role_id are required"))?;

    let user = state.users.register(new_user).await.map_err(|e| {
        ApiError::from_store(
            e,
            &[
                (ConstraintViolation::Unique, "User already exists"),
                (ConstraintViolation::ForeignKey, "Role does not exist"),
            ],
        )
    })?;

    Ok(ApiResponse::created("User registered successfully", user))
}

#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<ApiResponse<LoginResponse>> {
    let (Some(email), Some(password)) = (request.email, request.password) else {
        return Err(ApiError::validation("Email and password are required"));
    };

    let user = state
        .users
        .verify_credentials(&email, &password)
        .await?
        .ok_or_else(|| ApiError::validation(LOGIN_FAILED))?;

    let token = state.auth.issue_token(user.id, &user.email, &user.role)?;
    info!(user_id = user.id, "User logged in");

    Ok(ApiResponse::ok("Login successful", LoginResponse { token, user }))
}

pub async fn list_users(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<ApiResponse<Vec<UserInfo>>> {
    authorize(user.role(), user.id(), Action::ListUsers, &Relation::none())?;

    let users = state.users.list().await?;
    Ok(ApiResponse::ok("Users fetched successfully", users))
}

/// The caller's own profile.
pub async fn me(State(state): State<AppState>, user: CurrentUser) -> ApiResult<ApiResponse<UserInfo>> {
    let info = state
        .users
        .get_info(user.id())
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::ok("User fetched successfully", info))
}
