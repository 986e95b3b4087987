//! API route definitions.

use axum::http::{HeaderValue, Method, header};
use axum::{
    Router, middleware,
    routing::{get, patch, post, put},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::error::ApiError;
use super::handlers;
use super::state::AppState;
use crate::auth::auth_middleware;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let auth_state = state.auth.clone();

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/role", get(handlers::list_roles))
        .route("/api/role/{id}", get(handlers::get_role))
        .route("/api/users", post(handlers::register))
        .route("/api/users/auth/login", post(handlers::login))
        .with_state(state.clone());

    // Role writes are public unless configured otherwise
    let mut role_write_routes = Router::new()
        .route("/api/role", post(handlers::create_role))
        .route(
            "/api/role/{id}",
            put(handlers::update_role).delete(handlers::delete_role),
        );
    if state.auth.protect_role_writes() {
        role_write_routes = role_write_routes.route_layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ));
    }
    let role_write_routes = role_write_routes.with_state(state.clone());

    // Protected routes (require authentication)
    let protected_routes = Router::new()
        .route("/api/users", get(handlers::list_users))
        .route("/api/users/me", get(handlers::me))
        .route(
            "/api/tickets",
            get(handlers::list_tickets).post(handlers::create_ticket),
        )
        .route(
            "/api/tickets/{id}",
            get(handlers::get_ticket).delete(handlers::delete_ticket),
        )
        .route("/api/tickets/{id}/assign", patch(handlers::assign_ticket))
        .route(
            "/api/tickets/{id}/status",
            patch(handlers::update_ticket_status),
        )
        .route(
            "/api/tickets/{id}/comments",
            get(handlers::list_ticket_comments).post(handlers::add_ticket_comment),
        )
        .route("/api/comments", get(handlers::list_comments))
        .route(
            "/api/comments/{id}",
            patch(handlers::update_comment).delete(handlers::delete_comment),
        )
        .route_layer(middleware::from_fn_with_state(auth_state, auth_middleware))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(role_write_routes)
        .merge(protected_routes)
        .fallback(route_not_found)
        .layer(cors)
        .layer(trace_layer)
}

async fn route_not_found() -> ApiError {
    ApiError::not_found("Route not found")
}

/// Build the CORS layer based on configuration.
///
/// With no configured origins any origin is allowed, without credentials.
fn build_cors_layer(state: &AppState) -> CorsLayer {
    let allowed_origins = state.auth.allowed_origins();

    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let headers = [header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT];

    if allowed_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(headers);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("CORS: Invalid origin in config: {}", origin);
                None
            })
        })
        .collect();

    if origins.is_empty() {
        tracing::error!("CORS: All configured origins are invalid!");
        CorsLayer::new().allow_origin(AllowOrigin::exact(HeaderValue::from_static("null")))
    } else {
        tracing::info!("CORS: Allowing {} origin(s)", origins.len());
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(headers)
            .allow_credentials(true)
    }
}
