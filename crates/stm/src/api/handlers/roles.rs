//! Role handlers.
//!
//! Reads are public. Writes are public too unless `auth.protect_role_writes`
//! is set, in which case the router gates them and only MANAGER may proceed.

use axum::extract::State;
use tracing::instrument;

use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{ApiJson, ResourceId};
use crate::api::state::AppState;
use crate::api::ApiResponse;
use crate::auth::{Action, AuthError, CurrentUser, Relation, authorize};
use crate::db::ConstraintViolation;
use crate::role::{RoleRecord, RoleRequest};

const ROLE_EXISTS: &str = "Role already exists";

fn check_role_write(state: &AppState, caller: Option<&CurrentUser>) -> ApiResult<()> {
    if !state.auth.protect_role_writes() {
        return Ok(());
    }
    let user = caller.ok_or(AuthError::MissingAuthHeader)?;
    authorize(user.role(), user.id(), Action::ManageRoles, &Relation::none())?;
    Ok(())
}

fn required_name(request: RoleRequest) -> ApiResult<String> {
    request
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::validation("Role name is required"))
}

#[instrument(skip(state, caller, request))]
pub async fn create_role(
    State(state): State<AppState>,
    caller: Option<CurrentUser>,
    ApiJson(request): ApiJson<RoleRequest>,
) -> ApiResult<ApiResponse<RoleRecord>> {
    check_role_write(&state, caller.as_ref())?;
    let name = required_name(request)?;

    let role = state
        .roles
        .create(&name)
        .await
        .map_err(|e| ApiError::from_store(e, &[(ConstraintViolation::Unique, ROLE_EXISTS)]))?;

    Ok(ApiResponse::created("Role created successfully", role))
}

pub async fn list_roles(State(state): State<AppState>) -> ApiResult<ApiResponse<Vec<RoleRecord>>> {
    let roles = state.roles.list().await?;
    Ok(ApiResponse::ok("Roles fetched successfully", roles))
}

pub async fn get_role(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> ApiResult<ApiResponse<RoleRecord>> {
    let role = state
        .roles
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Role not found"))?;

    Ok(ApiResponse::ok("Role fetched successfully", role))
}

#[instrument(skip(state, caller, request))]
pub async fn update_role(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    caller: Option<CurrentUser>,
    ApiJson(request): ApiJson<RoleRequest>,
) -> ApiResult<ApiResponse<RoleRecord>> {
    check_role_write(&state, caller.as_ref())?;
    let name = required_name(request)?;

    let role = state
        .roles
        .update(id, &name)
        .await
        .map_err(|e| ApiError::from_store(e, &[(ConstraintViolation::Unique, ROLE_EXISTS)]))?
        .ok_or_else(|| ApiError::not_found("Role not found"))?;

    Ok(ApiResponse::ok("Role updated successfully", role))
}

#[instrument(skip(state, caller))]
pub async fn delete_role(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    caller: Option<CurrentUser>,
) -> ApiResult<ApiResponse<()>> {
    check_role_write(&state, caller.as_ref())?;

    let deleted = state.roles.delete(id).await.map_err(|e| {
        ApiError::from_store(
            e,
            &[(
                ConstraintViolation::ForeignKey,
                "Cannot delete role. It is assigned to users.",
            )],
        )
    })?;

    if !deleted {
        return Err(ApiError::not_found("Role not found"));
    }

    Ok(ApiResponse::message("Role deleted successfully"))
}
