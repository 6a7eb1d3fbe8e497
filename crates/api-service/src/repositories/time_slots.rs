//! Time slot repository: per-user schedules with locally-unique slot ids.

use crate::errors::ApiError;
use crate::models::TimeSlotRow;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// List a user's schedule in slot-id order. Empty when none set.
pub async fn list(pool: &PgPool, user_id: Uuid) -> Result<Vec<TimeSlotRow>, ApiError> {
    let slots = sqlx::query_as::<_, TimeSlotRow>(
        r#"
        SELECT user_id, slot_id, start_time, end_time, created_at
        FROM time_slots
        WHERE user_id = $1
        ORDER BY slot_id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to list time slots: {}", e)))?;

    Ok(slots)
}

/// Insert a slot, assigning the next id in the same statement:
/// max(existing)+1, or 0 for an empty schedule.
pub async fn insert(
    pool: &PgPool,
    user_id: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
) -> Result<TimeSlotRow, ApiError> {
    let slot = sqlx::query_as::<_, TimeSlotRow>(
        r#"
        INSERT INTO time_slots (user_id, slot_id, start_time, end_time)
        SELECT $1, COALESCE(MAX(slot_id) + 1, 0), $2, $3
        FROM time_slots
        WHERE user_id = $1
        RETURNING user_id, slot_id, start_time, end_time, created_at
        "#,
    )
    .bind(user_id)
    .bind(start_time)
    .bind(end_time)
    .fetch_one(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to insert time slot: {}", e)))?;

    Ok(slot)
}

/// Partial update: only non-null arguments overwrite stored columns.
pub async fn update(
    pool: &PgPool,
    user_id: Uuid,
    slot_id: i32,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
) -> Result<Option<TimeSlotRow>, ApiError> {
    let slot = sqlx::query_as::<_, TimeSlotRow>(
        r#"
        UPDATE time_slots
        SET
            start_time = COALESCE($3, start_time),
            end_time = COALESCE($4, end_time)
        WHERE user_id = $1 AND slot_id = $2
        RETURNING user_id, slot_id, start_time, end_time, created_at
        "#,
    )
    .bind(user_id)
    .bind(slot_id)
    .bind(start_time)
    .bind(end_time)
    .fetch_optional(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to update time slot: {}", e)))?;

    Ok(slot)
}

/// Delete by id; `false` means nothing was removed.
pub async fn delete(pool: &PgPool, user_id: Uuid, slot_id: i32) -> Result<bool, ApiError> {
    let result = sqlx::query("DELETE FROM time_slots WHERE user_id = $1 AND slot_id = $2")
        .bind(user_id)
        .bind(slot_id)
        .execute(pool)
        .await
        .map_err(|e| ApiError::Database(format!("Failed to delete time slot: {}", e)))?;

    Ok(result.rows_affected() == 1)
}
