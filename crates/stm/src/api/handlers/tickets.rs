//! Ticket handlers, including the comments nested under a ticket.

use axum::extract::State;
use tracing::{info, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{ApiJson, ResourceId};
use crate::api::state::AppState;
use crate::api::ApiResponse;
use crate::auth::{Action, CurrentUser, Relation, authorize, ticket_scope};
use crate::comment::{Comment, CommentRequest, CommentWithAuthor};
use crate::db::ConstraintViolation;
use crate::ticket::{
    AssignRequest, CreateTicketRequest, StatusRequest, Ticket, TicketListing,
};

const TICKET_NOT_FOUND: &str = "Ticket not found";
const UNKNOWN_ASSIGNEE: &str = "Assigned user does not exist";

/// Read a ticket and check `action` against it.
///
/// A missing ticket is judged with an empty relation first, so callers whose
/// access depends on ownership see 403 rather than learning it is absent.
async fn fetch_authorized(
    state: &AppState,
    user: &CurrentUser,
    id: i64,
    action: Action,
) -> ApiResult<Ticket> {
    match state.tickets.get(id).await? {
        Some(ticket) => {
            authorize(user.role(), user.id(), action, &ticket.relation())?;
            Ok(ticket)
        }
        None => {
            authorize(user.role(), user.id(), action, &Relation::none())?;
            Err(ApiError::not_found(TICKET_NOT_FOUND))
        }
    }
}

pub async fn list_tickets(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<ApiResponse<Vec<TicketListing>>> {
    authorize(user.role(), user.id(), Action::ListTickets, &Relation::none())?;

    let tickets = state
        .tickets
        .list(ticket_scope(user.role(), user.id()))
        .await?;

    Ok(ApiResponse::ok("Tickets fetched successfully", tickets))
}

pub async fn get_ticket(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    user: CurrentUser,
) -> ApiResult<ApiResponse<Ticket>> {
    let ticket = fetch_authorized(&state, &user, id, Action::ReadTicket).await?;
    Ok(ApiResponse::ok("Ticket fetched successfully", ticket))
}

#[instrument(skip(state, user, request), fields(user_id = user.id()))]
pub async fn create_ticket(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(request): ApiJson<CreateTicketRequest>,
) -> ApiResult<ApiResponse<Ticket>> {
    authorize(user.role(), user.id(), Action::CreateTicket, &Relation::none())?;

    let new_ticket = request
        .into_new_ticket(user.id())
        .ok_or_else(|| ApiError::validation("Title is required"))?;

    let ticket = state.tickets.create(new_ticket).await.map_err(|e| {
        ApiError::from_store(e, &[(ConstraintViolation::ForeignKey, UNKNOWN_ASSIGNEE)])
    })?;
    info!(ticket_id = ticket.id, "Ticket created");

    Ok(ApiResponse::created("Ticket created successfully", ticket))
}

#[instrument(skip(state, user, request), fields(user_id = user.id()))]
pub async fn assign_ticket(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    user: CurrentUser,
    ApiJson(request): ApiJson<AssignRequest>,
) -> ApiResult<ApiResponse<Ticket>> {
    authorize(user.role(), user.id(), Action::AssignTicket, &Relation::none())?;

    let assignee = request
        .assigned_to
        .ok_or_else(|| ApiError::validation("assigned_to is required"))?;

    let ticket = state
        .tickets
        .assign(id, assignee)
        .await
        .map_err(|e| {
            ApiError::from_store(e, &[(ConstraintViolation::ForeignKey, UNKNOWN_ASSIGNEE)])
        })?
        .ok_or_else(|| ApiError::not_found(TICKET_NOT_FOUND))?;

    Ok(ApiResponse::ok("Ticket assigned successfully", ticket))
}

#[instrument(skip(state, user, request), fields(user_id = user.id()))]
pub async fn update_ticket_status(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    user: CurrentUser,
    ApiJson(request): ApiJson<StatusRequest>,
) -> ApiResult<ApiResponse<Ticket>> {
    authorize(
        user.role(),
        user.id(),
        Action::UpdateTicketStatus,
        &Relation::none(),
    )?;

    let status = request
        .status
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::validation("Status is required"))?;

    let ticket = state
        .tickets
        .set_status(id, &status)
        .await?
        .ok_or_else(|| ApiError::not_found(TICKET_NOT_FOUND))?;

    Ok(ApiResponse::ok("Status updated successfully", ticket))
}

#[instrument(skip(state, user), fields(user_id = user.id()))]
pub async fn delete_ticket(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    user: CurrentUser,
) -> ApiResult<ApiResponse<()>> {
    authorize(user.role(), user.id(), Action::DeleteTicket, &Relation::none())?;

    if !state.tickets.delete(id).await? {
        return Err(ApiError::not_found(TICKET_NOT_FOUND));
    }
    info!(ticket_id = id, "Ticket deleted");

    Ok(ApiResponse::message("Ticket deleted successfully"))
}

#[instrument(skip(state, user, request), fields(user_id = user.id()))]
pub async fn add_ticket_comment(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    user: CurrentUser,
    ApiJson(request): ApiJson<CommentRequest>,
) -> ApiResult<ApiResponse<Comment>> {
    let ticket = fetch_authorized(&state, &user, id, Action::CommentOnTicket).await?;

    let text = request
        .text()
        .ok_or_else(|| ApiError::validation("Comment is required"))?;

    let comment = state.comments.add(ticket.id, user.id(), &text).await?;
    Ok(ApiResponse::created("Comment added successfully", comment))
}

pub async fn list_ticket_comments(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    user: CurrentUser,
) -> ApiResult<ApiResponse<Vec<CommentWithAuthor>>> {
    let ticket = fetch_authorized(&state, &user, id, Action::CommentOnTicket).await?;

    let comments = state.comments.list_for_ticket(ticket.id).await?;
    Ok(ApiResponse::ok("Comments fetched successfully", comments))
}
