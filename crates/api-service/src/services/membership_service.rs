//! Invitation synchronization.
//!
//! The source of truth is the `meeting_members` relation; a status
//! transition is a single-statement write, so there is no dual-write to
//! partially fail and the user/meeting views cannot diverge.

use crate::errors::ApiError;
use crate::models::{
    CreateMeetingRequest, MeetingDetailsResponse, MeetingResponse, MeetingTile,
    MembershipStatus, ParticipantDetail, ParticipantEntry,
};
use crate::repositories::{meetings, memberships, users};
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

/// Apply a (user, meeting, status) transition to the membership relation.
///
/// Both parties must exist. `needs_acceptance` is an invite and upserts the
/// entry (a repeated invite resets it to pending rather than duplicating).
/// Any other status answers an existing invite and overwrites it in place;
/// when no entry exists the update matches nothing and is a silent no-op,
/// which is the documented policy rather than an error.
pub async fn set_membership(
    pool: &PgPool,
    user_id: Uuid,
    meeting_id: Uuid,
    status: MembershipStatus,
) -> Result<(), ApiError> {
    ensure_user_exists(pool, user_id).await?;
    ensure_meeting_exists(pool, meeting_id).await?;

    if status.is_pending_invite() {
        memberships::upsert(pool, meeting_id, user_id, status).await?;
    } else {
        memberships::update_status(pool, meeting_id, user_id, status).await?;
    }

    info!(
        target: "api.membership",
        user_id = %user_id,
        meeting_id = %meeting_id,
        status = status.as_str(),
        "Membership transition applied"
    );

    Ok(())
}

/// Invite the caller to a meeting (pending entry on the relation).
pub async fn invite_self(pool: &PgPool, user_id: Uuid, meeting_id: Uuid) -> Result<(), ApiError> {
    set_membership(pool, user_id, meeting_id, MembershipStatus::NeedsAcceptance).await
}

/// Create a meeting with the caller as admin, automatically enrolled as a
/// pending participant.
pub async fn create_meeting(
    pool: &PgPool,
    admin_id: Uuid,
    request: &CreateMeetingRequest,
) -> Result<MeetingResponse, ApiError> {
    ensure_user_exists(pool, admin_id).await?;

    let meeting = meetings::create(
        pool,
        request.title.trim(),
        request.start,
        &request.description,
        request.group_id,
        admin_id,
    )
    .await?;

    memberships::upsert(
        pool,
        meeting.meeting_id,
        admin_id,
        MembershipStatus::NeedsAcceptance,
    )
    .await?;

    info!(
        target: "api.membership",
        meeting_id = %meeting.meeting_id,
        admin_id = %admin_id,
        "Meeting created"
    );

    let participants = participant_entries(pool, meeting.meeting_id).await?;
    Ok(MeetingResponse::from_row(meeting, participants))
}

/// A meeting with its participant view attached.
pub async fn meeting_with_participants(
    pool: &PgPool,
    meeting_id: Uuid,
) -> Result<MeetingResponse, ApiError> {
    let meeting = meetings::get_by_id(pool, meeting_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("meeting {}", meeting_id)))?;

    let participants = participant_entries(pool, meeting_id).await?;
    Ok(MeetingResponse::from_row(meeting, participants))
}

/// All meetings with participant views, assembled from one batch query.
pub async fn all_meetings(pool: &PgPool) -> Result<Vec<MeetingResponse>, ApiError> {
    let rows = meetings::list(pool).await?;
    let ids: Vec<Uuid> = rows.iter().map(|m| m.meeting_id).collect();

    let mut by_meeting: HashMap<Uuid, Vec<ParticipantEntry>> = HashMap::new();
    for entry in memberships::participants_for_meetings(pool, &ids).await? {
        by_meeting
            .entry(entry.meeting_id)
            .or_default()
            .push(ParticipantEntry {
                user_id: entry.user_id,
                status: parse_stored_status(&entry.status)?,
            });
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let participants = by_meeting.remove(&row.meeting_id).unwrap_or_default();
            MeetingResponse::from_row(row, participants)
        })
        .collect())
}

/// The caller's meeting view: tiles derived from the membership relation.
pub async fn user_meetings(pool: &PgPool, user_id: Uuid) -> Result<Vec<MeetingTile>, ApiError> {
    ensure_user_exists(pool, user_id).await?;

    let rows = memberships::meetings_for_user(pool, user_id).await?;

    rows.into_iter()
        .map(|row| {
            Ok(MeetingTile {
                id: row.meeting_id,
                title: row.title,
                start: row.start_time,
                group_id: row.group_id,
                status: parse_stored_status(&row.status)?,
            })
        })
        .collect()
}

/// The full meeting view for a requesting member.
///
/// Participants are joined with user records for display names. A requester
/// with no membership entry gets NotFound: the view includes "your status"
/// and cannot be produced without one.
pub async fn meeting_details(
    pool: &PgPool,
    meeting_id: Uuid,
    requesting_user_id: Uuid,
) -> Result<MeetingDetailsResponse, ApiError> {
    ensure_user_exists(pool, requesting_user_id).await?;

    let meeting = meetings::get_by_id(pool, meeting_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("meeting {}", meeting_id)))?;

    let own_entry = memberships::get(pool, meeting_id, requesting_user_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("invite for meeting {}", meeting_id))
        })?;

    let participants = memberships::participants_with_users(pool, meeting_id)
        .await?
        .into_iter()
        .map(|row| {
            Ok(ParticipantDetail {
                user_id: row.user_id,
                username: row.username,
                status: parse_stored_status(&row.status)?,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok(MeetingDetailsResponse {
        id: meeting.meeting_id,
        title: meeting.title,
        start: meeting.start_time,
        group_id: meeting.group_id,
        admin_id: meeting.admin_id,
        description: meeting.description,
        participants,
        status: parse_stored_status(&own_entry.status)?,
    })
}

async fn ensure_user_exists(pool: &PgPool, user_id: Uuid) -> Result<(), ApiError> {
    users::get_by_id(pool, user_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::NotFound(format!("user {}", user_id)))
}

async fn ensure_meeting_exists(pool: &PgPool, meeting_id: Uuid) -> Result<(), ApiError> {
    meetings::get_by_id(pool, meeting_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::NotFound(format!("meeting {}", meeting_id)))
}

async fn participant_entries(
    pool: &PgPool,
    meeting_id: Uuid,
) -> Result<Vec<ParticipantEntry>, ApiError> {
    memberships::participants(pool, meeting_id)
        .await?
        .into_iter()
        .map(|row| {
            Ok(ParticipantEntry {
                user_id: row.user_id,
                status: parse_stored_status(&row.status)?,
            })
        })
        .collect()
}

/// Stored statuses are written via [`MembershipStatus::as_str`]; anything
/// else in the column is data corruption, not caller error.
fn parse_stored_status(s: &str) -> Result<MembershipStatus, ApiError> {
    MembershipStatus::parse(s)
        .ok_or_else(|| ApiError::Database(format!("Unrecognized stored membership status: {}", s)))
}
