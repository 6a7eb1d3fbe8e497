//! Schedule handlers, all scoped to the authenticated caller.

use crate::errors::ApiError;
use crate::middleware::AuthUser;
use crate::models::{
    CreateTimeSlotRequest, TimeSlotCollection, TimeSlotResponse, UpdateTimeSlotRequest,
};
use crate::repositories::{time_slots, users};
use crate::routes::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// GET /time_slots/
pub async fn list_time_slots(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<TimeSlotCollection>, ApiError> {
    ensure_account_exists(&state.pool, auth.user_id).await?;

    let time_slots = time_slots::list(&state.pool, auth.user_id)
        .await?
        .into_iter()
        .map(TimeSlotResponse::from)
        .collect();

    Ok(Json(TimeSlotCollection { time_slots }))
}

/// POST /time_slots/
pub async fn create_time_slot(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateTimeSlotRequest>,
) -> Result<(StatusCode, Json<TimeSlotResponse>), ApiError> {
    ensure_account_exists(&state.pool, auth.user_id).await?;

    let slot = time_slots::insert(&state.pool, auth.user_id, payload.start, payload.end).await?;

    Ok((StatusCode::CREATED, Json(TimeSlotResponse::from(slot))))
}

/// PATCH /time_slots/{slot_id}
pub async fn update_time_slot(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(slot_id): Path<i32>,
    Json(payload): Json<UpdateTimeSlotRequest>,
) -> Result<Json<TimeSlotResponse>, ApiError> {
    ensure_account_exists(&state.pool, auth.user_id).await?;

    if !payload.has_changes() {
        let slots = time_slots::list(&state.pool, auth.user_id).await?;
        let slot = slots
            .into_iter()
            .find(|s| s.slot_id == slot_id)
            .ok_or_else(|| ApiError::NotFound(format!("time_slot {}", slot_id)))?;
        return Ok(Json(TimeSlotResponse::from(slot)));
    }

    let slot = time_slots::update(
        &state.pool,
        auth.user_id,
        slot_id,
        payload.start,
        payload.end,
    )
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("time_slot {}", slot_id)))?;

    Ok(Json(TimeSlotResponse::from(slot)))
}

/// DELETE /time_slots/{slot_id}
pub async fn delete_time_slot(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(slot_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    ensure_account_exists(&state.pool, auth.user_id).await?;

    if !time_slots::delete(&state.pool, auth.user_id, slot_id).await? {
        return Err(ApiError::NotFound(format!("time_slot {}", slot_id)));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// A valid token can outlive its account; schedule operations 404 then.
async fn ensure_account_exists(pool: &PgPool, user_id: Uuid) -> Result<(), ApiError> {
    users::get_by_id(pool, user_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::NotFound(format!("user {}", user_id)))
}
