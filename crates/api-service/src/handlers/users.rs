//! User account handlers.

use crate::errors::ApiError;
use crate::models::{
    RegisterRequest, UpdateUserRequest, UserCollection, UserResponse,
};
use crate::repositories::users;
use crate::routes::AppState;
use crate::services::registration_service;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

/// POST /register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = registration_service::register(
        &state.pool,
        &payload.email,
        &payload.password,
        &payload.username,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// GET /users/
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<UserCollection>, ApiError> {
    let users = users::list(&state.pool)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(UserCollection { users }))
}

/// GET /users/{id}
pub async fn show_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = users::get_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user {}", id)))?;

    Ok(Json(UserResponse::from(user)))
}

/// PUT /users/{id}
///
/// Partial update; an empty body returns the stored document unchanged.
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    if !payload.has_changes() {
        let user = users::get_by_id(&state.pool, id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("user {}", id)))?;
        return Ok(Json(UserResponse::from(user)));
    }

    // A password change is re-hashed, never stored raw
    let password_hash = match payload.password.as_deref() {
        Some(password) => Some(bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| {
            tracing::error!(target: "api.users", error = %e, "Password hashing failed");
            ApiError::Internal
        })?),
        None => None,
    };

    let user = users::update(
        &state.pool,
        id,
        payload.email.as_deref(),
        payload.username.as_deref(),
        password_hash.as_deref(),
    )
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("user {}", id)))?;

    Ok(Json(UserResponse::from(user)))
}

/// DELETE /users/{id}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !users::delete(&state.pool, id).await? {
        return Err(ApiError::NotFound(format!("user {}", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}
