//! Meeting and invitation handlers.

use crate::errors::ApiError;
use crate::middleware::AuthUser;
use crate::models::{
    CreateMeetingRequest, InviteStatusResponse, MeetingCollection, MeetingDetailsResponse,
    MeetingResponse, MeetingTileCollection, MembershipStatus, ParticipantInviteResponse,
    UpdateInviteStatusRequest, UpdateMeetingRequest, UpdateParticipantStatusRequest,
};
use crate::repositories::meetings;
use crate::routes::AppState;
use crate::services::membership_service;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use uuid::Uuid;

/// POST /meetings/
///
/// Creates the meeting with the caller as admin and auto-enrolls them as a
/// pending participant.
pub async fn create_meeting(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateMeetingRequest>,
) -> Result<(StatusCode, Json<MeetingResponse>), ApiError> {
    payload.validate().map_err(ApiError::BadRequest)?;

    let meeting = membership_service::create_meeting(&state.pool, auth.user_id, &payload).await?;

    Ok((StatusCode::CREATED, Json(meeting)))
}

/// GET /meetings/all
pub async fn list_meetings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MeetingCollection>, ApiError> {
    let meetings = membership_service::all_meetings(&state.pool).await?;

    Ok(Json(MeetingCollection { meetings }))
}

/// GET /meetings/ returning the caller's meeting view.
pub async fn list_user_meetings(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<MeetingTileCollection>, ApiError> {
    let meetings = membership_service::user_meetings(&state.pool, auth.user_id).await?;

    Ok(Json(MeetingTileCollection { meetings }))
}

/// GET /meetings/{id}
pub async fn show_meeting(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<MeetingResponse>, ApiError> {
    let meeting = membership_service::meeting_with_participants(&state.pool, id).await?;

    Ok(Json(meeting))
}

/// GET /meetings/{id}/details
pub async fn show_meeting_details(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<MeetingDetailsResponse>, ApiError> {
    let details = membership_service::meeting_details(&state.pool, id, auth.user_id).await?;

    Ok(Json(details))
}

/// PATCH /meetings/{id}/change_participant_status
///
/// Applies a status transition to the named participant.
pub async fn change_participant_status(
    State(state): State<Arc<AppState>>,
    Extension(_auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateParticipantStatusRequest>,
) -> Result<Json<ParticipantInviteResponse>, ApiError> {
    let status = parse_status(&payload.status)?;

    membership_service::set_membership(&state.pool, payload.id, id, status).await?;

    Ok(Json(ParticipantInviteResponse {
        meeting_id: id,
        user_id: payload.id,
        status,
    }))
}

/// POST /meetings/{id}/invite
///
/// The caller invites themself: a pending entry appears on the relation.
pub async fn invite(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ParticipantInviteResponse>, ApiError> {
    membership_service::invite_self(&state.pool, auth.user_id, id).await?;

    Ok(Json(ParticipantInviteResponse {
        meeting_id: id,
        user_id: auth.user_id,
        status: MembershipStatus::NeedsAcceptance,
    }))
}

/// PATCH /invites/{id}
///
/// The caller answers their own invite for meeting `{id}`.
pub async fn change_invite_status(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateInviteStatusRequest>,
) -> Result<Json<InviteStatusResponse>, ApiError> {
    let status = parse_status(&payload.status)?;

    membership_service::set_membership(&state.pool, auth.user_id, id, status).await?;

    Ok(Json(InviteStatusResponse {
        meeting_id: id,
        status,
    }))
}

/// PATCH /meetings/{id}
///
/// Partial update; an empty body returns the stored document unchanged.
pub async fn update_meeting(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMeetingRequest>,
) -> Result<Json<MeetingResponse>, ApiError> {
    if payload.has_changes() {
        meetings::update(
            &state.pool,
            id,
            payload.title.as_deref(),
            payload.start,
            payload.description.as_deref(),
        )
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("meeting {}", id)))?;
    }

    let meeting = membership_service::meeting_with_participants(&state.pool, id).await?;

    Ok(Json(meeting))
}

/// DELETE /meetings/{id}
///
/// Membership rows cascade with the meeting.
pub async fn delete_meeting(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !meetings::delete(&state.pool, id).await? {
        return Err(ApiError::NotFound(format!("meeting {}", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}

fn parse_status(raw: &str) -> Result<MembershipStatus, ApiError> {
    MembershipStatus::parse(raw)
        .ok_or_else(|| ApiError::BadRequest("Invalid status".to_string()))
}
