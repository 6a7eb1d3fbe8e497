//! Membership relation repository.
//!
//! `meeting_members` is the single source of truth for the (user, meeting,
//! status) relation. Both the "user's meetings" and "meeting's participants"
//! views are derived from it by query, so the two can never diverge.

use crate::errors::ApiError;
use crate::models::{MembershipRow, MembershipStatus};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// A participant joined with their user record.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ParticipantUserRow {
    pub user_id: Uuid,
    pub username: String,
    pub status: String,
}

/// A membership joined with its meeting: one entry of the user's view.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserMeetingRow {
    pub meeting_id: Uuid,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub group_id: Uuid,
    pub status: String,
}

/// Insert or reset a membership entry.
///
/// The composite primary key makes a repeated invite an upsert: the entry
/// is reset to the given status instead of appending a duplicate.
pub async fn upsert(
    pool: &PgPool,
    meeting_id: Uuid,
    user_id: Uuid,
    status: MembershipStatus,
) -> Result<MembershipRow, ApiError> {
    let row = sqlx::query_as::<_, MembershipRow>(
        r#"
        INSERT INTO meeting_members (meeting_id, user_id, status)
        VALUES ($1, $2, $3)
        ON CONFLICT (meeting_id, user_id)
        DO UPDATE SET status = EXCLUDED.status, updated_at = NOW()
        RETURNING meeting_id, user_id, status, invited_at, updated_at
        "#,
    )
    .bind(meeting_id)
    .bind(user_id)
    .bind(status.as_str())
    .fetch_one(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to upsert membership: {}", e)))?;

    Ok(row)
}

/// Overwrite the status of an existing membership entry in place.
///
/// Returns `None` when no entry exists for the pair; callers decide whether
/// that is an error or a no-op.
pub async fn update_status(
    pool: &PgPool,
    meeting_id: Uuid,
    user_id: Uuid,
    status: MembershipStatus,
) -> Result<Option<MembershipRow>, ApiError> {
    let row = sqlx::query_as::<_, MembershipRow>(
        r#"
        UPDATE meeting_members
        SET status = $3, updated_at = NOW()
        WHERE meeting_id = $1 AND user_id = $2
        RETURNING meeting_id, user_id, status, invited_at, updated_at
        "#,
    )
    .bind(meeting_id)
    .bind(user_id)
    .bind(status.as_str())
    .fetch_optional(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to update membership status: {}", e)))?;

    Ok(row)
}

/// Fetch a single membership entry.
pub async fn get(
    pool: &PgPool,
    meeting_id: Uuid,
    user_id: Uuid,
) -> Result<Option<MembershipRow>, ApiError> {
    let row = sqlx::query_as::<_, MembershipRow>(
        r#"
        SELECT meeting_id, user_id, status, invited_at, updated_at
        FROM meeting_members
        WHERE meeting_id = $1 AND user_id = $2
        "#,
    )
    .bind(meeting_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to fetch membership: {}", e)))?;

    Ok(row)
}

/// The "meeting's participants" view, in invite order.
pub async fn participants(
    pool: &PgPool,
    meeting_id: Uuid,
) -> Result<Vec<MembershipRow>, ApiError> {
    let rows = sqlx::query_as::<_, MembershipRow>(
        r#"
        SELECT meeting_id, user_id, status, invited_at, updated_at
        FROM meeting_members
        WHERE meeting_id = $1
        ORDER BY invited_at
        "#,
    )
    .bind(meeting_id)
    .fetch_all(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to fetch participants: {}", e)))?;

    Ok(rows)
}

/// Participant entries for a set of meetings, for batch view assembly.
pub async fn participants_for_meetings(
    pool: &PgPool,
    meeting_ids: &[Uuid],
) -> Result<Vec<MembershipRow>, ApiError> {
    let rows = sqlx::query_as::<_, MembershipRow>(
        r#"
        SELECT meeting_id, user_id, status, invited_at, updated_at
        FROM meeting_members
        WHERE meeting_id = ANY($1)
        ORDER BY invited_at
        "#,
    )
    .bind(meeting_ids)
    .fetch_all(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to fetch participants: {}", e)))?;

    Ok(rows)
}

/// Participants joined with user records for the details view.
///
/// Entries whose user row no longer exists drop out of the join.
pub async fn participants_with_users(
    pool: &PgPool,
    meeting_id: Uuid,
) -> Result<Vec<ParticipantUserRow>, ApiError> {
    let rows = sqlx::query_as::<_, ParticipantUserRow>(
        r#"
        SELECT m.user_id, u.username, m.status
        FROM meeting_members m
        JOIN users u ON u.user_id = m.user_id
        WHERE m.meeting_id = $1
        ORDER BY m.invited_at
        "#,
    )
    .bind(meeting_id)
    .fetch_all(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to fetch participant details: {}", e)))?;

    Ok(rows)
}

/// The "user's meetings" view: memberships joined with meetings, in invite
/// order. Memberships whose meeting was deleted cannot appear (cascade).
pub async fn meetings_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<UserMeetingRow>, ApiError> {
    let rows = sqlx::query_as::<_, UserMeetingRow>(
        r#"
        SELECT mt.meeting_id, mt.title, mt.start_time, mt.group_id, m.status
        FROM meeting_members m
        JOIN meetings mt ON mt.meeting_id = m.meeting_id
        WHERE m.user_id = $1
        ORDER BY m.invited_at
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to fetch user meetings: {}", e)))?;

    Ok(rows)
}
