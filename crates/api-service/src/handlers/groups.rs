//! Group handlers.

use crate::errors::ApiError;
use crate::models::{
    CreateGroupRequest, GroupCollection, GroupResponse, UpdateGroupRequest,
};
use crate::repositories::groups;
use crate::routes::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

/// POST /groups/
pub async fn create_group(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<GroupResponse>), ApiError> {
    payload.validate().map_err(ApiError::BadRequest)?;

    let group = groups::create(
        &state.pool,
        payload.name.trim(),
        payload.description.as_deref(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(GroupResponse::from(group))))
}

/// GET /groups/
pub async fn list_groups(
    State(state): State<Arc<AppState>>,
) -> Result<Json<GroupCollection>, ApiError> {
    let groups = groups::list(&state.pool)
        .await?
        .into_iter()
        .map(GroupResponse::from)
        .collect();

    Ok(Json(GroupCollection { groups }))
}

/// GET /groups/{id}
pub async fn show_group(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<GroupResponse>, ApiError> {
    let group = groups::get_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("group {}", id)))?;

    Ok(Json(GroupResponse::from(group)))
}

/// PUT /groups/{id}
///
/// Partial update; an empty body returns the stored document unchanged.
pub async fn update_group(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateGroupRequest>,
) -> Result<Json<GroupResponse>, ApiError> {
    if !payload.has_changes() {
        let group = groups::get_by_id(&state.pool, id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("group {}", id)))?;
        return Ok(Json(GroupResponse::from(group)));
    }

    let group = groups::update(
        &state.pool,
        id,
        payload.name.as_deref(),
        payload.description.as_deref(),
    )
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("group {}", id)))?;

    Ok(Json(GroupResponse::from(group)))
}

/// DELETE /groups/{id}
pub async fn delete_group(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !groups::delete(&state.pool, id).await? {
        return Err(ApiError::NotFound(format!("group {}", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}
