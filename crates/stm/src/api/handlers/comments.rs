//! Handlers for comments addressed by their own id.

use axum::extract::State;
use tracing::instrument;

use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{ApiJson, ResourceId};
use crate::api::state::AppState;
use crate::api::ApiResponse;
use crate::auth::{Action, CurrentUser, Relation, authorize};
use crate::comment::{Comment, CommentRequest};

const COMMENT_NOT_FOUND: &str = "Comment not found";

/// Read a comment and check that the caller may edit it.
async fn fetch_editable(state: &AppState, user: &CurrentUser, id: i64) -> ApiResult<Comment> {
    let comment = state
        .comments
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found(COMMENT_NOT_FOUND))?;

    authorize(user.role(), user.id(), Action::EditComment, &comment.relation())?;
    Ok(comment)
}

pub async fn list_comments(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<ApiResponse<Vec<Comment>>> {
    authorize(user.role(), user.id(), Action::ListComments, &Relation::none())?;

    let comments = state.comments.list_all().await?;
    Ok(ApiResponse::ok("Ticket comments fetched successfully", comments))
}

#[instrument(skip(state, user, request), fields(user_id = user.id()))]
pub async fn update_comment(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    user: CurrentUser,
    ApiJson(request): ApiJson<CommentRequest>,
) -> ApiResult<ApiResponse<Comment>> {
    fetch_editable(&state, &user, id).await?;

    let text = request
        .text()
        .ok_or_else(|| ApiError::validation("Comment is required"))?;

    let comment = state
        .comments
        .update(id, &text)
        .await?
        .ok_or_else(|| ApiError::not_found(COMMENT_NOT_FOUND))?;

    Ok(ApiResponse::ok("Comment updated successfully", comment))
}

#[instrument(skip(state, user), fields(user_id = user.id()))]
pub async fn delete_comment(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    user: CurrentUser,
) -> ApiResult<ApiResponse<()>> {
    fetch_editable(&state, &user, id).await?;

    if !state.comments.delete(id).await? {
        return Err(ApiError::not_found(COMMENT_NOT_FOUND));
    }

    Ok(ApiResponse::message("Comment deleted successfully"))
}
