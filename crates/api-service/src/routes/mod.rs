//! HTTP routes for the Convene API.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::handlers;
use crate::middleware::require_auth;
use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: PgPool,

    /// Service configuration.
    pub config: Config,
}

/// Build the application routes.
///
/// Protected routes sit behind the `require_auth` middleware; everything
/// else is public, matching the source API surface. Global layers:
/// request tracing, a 30 second timeout, and permissive CORS.
pub fn build_routes(state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Authentication
        .route("/login", post(handlers::auth::login))
        .route("/refresh", post(handlers::auth::refresh_token))
        .route("/register", post(handlers::users::register))
        // Users
        .route("/users/", get(handlers::users::list_users))
        .route(
            "/users/:id",
            get(handlers::users::show_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        // Meetings
        .route("/meetings/all", get(handlers::meetings::list_meetings))
        .route(
            "/meetings/:id",
            get(handlers::meetings::show_meeting)
                .patch(handlers::meetings::update_meeting)
                .delete(handlers::meetings::delete_meeting),
        )
        // Groups
        .route(
            "/groups/",
            post(handlers::groups::create_group).get(handlers::groups::list_groups),
        )
        .route(
            "/groups/:id",
            get(handlers::groups::show_group)
                .put(handlers::groups::update_group)
                .delete(handlers::groups::delete_group),
        )
        .with_state(state.clone());

    let protected_routes = Router::new()
        // Current account
        .route("/me", get(handlers::auth::me))
        // Schedule
        .route(
            "/time_slots/",
            get(handlers::time_slots::list_time_slots)
                .post(handlers::time_slots::create_time_slot),
        )
        .route(
            "/time_slots/:slot_id",
            patch(handlers::time_slots::update_time_slot)
                .delete(handlers::time_slots::delete_time_slot),
        )
        // Meetings and invitations
        .route(
            "/meetings/",
            post(handlers::meetings::create_meeting)
                .get(handlers::meetings::list_user_meetings),
        )
        .route(
            "/meetings/:id/details",
            get(handlers::meetings::show_meeting_details),
        )
        .route(
            "/meetings/:id/change_participant_status",
            patch(handlers::meetings::change_participant_status),
        )
        .route("/meetings/:id/invite", post(handlers::meetings::invite))
        .route(
            "/invites/:id",
            patch(handlers::meetings::change_invite_status),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    public_routes
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(CorsLayer::permissive())
}
