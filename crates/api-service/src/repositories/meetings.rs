//! Meeting repository module for database operations.

use crate::errors::ApiError;
use crate::models::{MeetingRow, LIST_LIMIT};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

const MEETING_COLUMNS: &str =
    "meeting_id, title, start_time, description, group_id, admin_id, created_at, updated_at";

/// Create a meeting. `admin_id` is set here, exactly once, to the creator.
pub async fn create(
    pool: &PgPool,
    title: &str,
    start_time: DateTime<Utc>,
    description: &str,
    group_id: Uuid,
    admin_id: Uuid,
) -> Result<MeetingRow, ApiError> {
    let meeting = sqlx::query_as::<_, MeetingRow>(
        r#"
        INSERT INTO meetings (title, start_time, description, group_id, admin_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING meeting_id, title, start_time, description, group_id, admin_id,
                  created_at, updated_at
        "#,
    )
    .bind(title)
    .bind(start_time)
    .bind(description)
    .bind(group_id)
    .bind(admin_id)
    .fetch_one(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to create meeting: {}", e)))?;

    Ok(meeting)
}

pub async fn get_by_id(pool: &PgPool, meeting_id: Uuid) -> Result<Option<MeetingRow>, ApiError> {
    let meeting = sqlx::query_as::<_, MeetingRow>(&format!(
        "SELECT {} FROM meetings WHERE meeting_id = $1",
        MEETING_COLUMNS
    ))
    .bind(meeting_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to fetch meeting: {}", e)))?;

    Ok(meeting)
}

pub async fn list(pool: &PgPool) -> Result<Vec<MeetingRow>, ApiError> {
    let meetings = sqlx::query_as::<_, MeetingRow>(&format!(
        "SELECT {} FROM meetings ORDER BY created_at LIMIT $1",
        MEETING_COLUMNS
    ))
    .bind(LIST_LIMIT)
    .fetch_all(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to list meetings: {}", e)))?;

    Ok(meetings)
}

/// Partial update: only non-null arguments overwrite stored columns.
/// `admin_id` and `group_id` are immutable after creation.
pub async fn update(
    pool: &PgPool,
    meeting_id: Uuid,
    title: Option<&str>,
    start_time: Option<DateTime<Utc>>,
    description: Option<&str>,
) -> Result<Option<MeetingRow>, ApiError> {
    let meeting = sqlx::query_as::<_, MeetingRow>(
        r#"
        UPDATE meetings
        SET
            title = COALESCE($2, title),
            start_time = COALESCE($3, start_time),
            description = COALESCE($4, description),
            updated_at = NOW()
        WHERE meeting_id = $1
        RETURNING meeting_id, title, start_time, description, group_id, admin_id,
                  created_at, updated_at
        "#,
    )
    .bind(meeting_id)
    .bind(title)
    .bind(start_time)
    .bind(description)
    .fetch_optional(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to update meeting: {}", e)))?;

    Ok(meeting)
}

/// Delete by id. Membership rows cascade with the meeting.
pub async fn delete(pool: &PgPool, meeting_id: Uuid) -> Result<bool, ApiError> {
    let result = sqlx::query("DELETE FROM meetings WHERE meeting_id = $1")
        .bind(meeting_id)
        .execute(pool)
        .await
        .map_err(|e| ApiError::Database(format!("Failed to delete meeting: {}", e)))?;

    Ok(result.rows_affected() == 1)
}
