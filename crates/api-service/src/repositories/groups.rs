//! Group repository module for database operations.

use crate::errors::ApiError;
use crate::models::{GroupRow, LIST_LIMIT};
use sqlx::PgPool;
use uuid::Uuid;

pub async fn create(
    pool: &PgPool,
    name: &str,
    description: Option<&str>,
) -> Result<GroupRow, ApiError> {
    let group = sqlx::query_as::<_, GroupRow>(
        r#"
        INSERT INTO groups (name, description)
        VALUES ($1, $2)
        RETURNING group_id, name, description, created_at, updated_at
        "#,
    )
    .bind(name)
    .bind(description)
    .fetch_one(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to create group: {}", e)))?;

    Ok(group)
}

pub async fn get_by_id(pool: &PgPool, group_id: Uuid) -> Result<Option<GroupRow>, ApiError> {
    let group = sqlx::query_as::<_, GroupRow>(
        "SELECT group_id, name, description, created_at, updated_at FROM groups WHERE group_id = $1",
    )
    .bind(group_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to fetch group: {}", e)))?;

    Ok(group)
}

pub async fn list(pool: &PgPool) -> Result<Vec<GroupRow>, ApiError> {
    let groups = sqlx::query_as::<_, GroupRow>(
        "SELECT group_id, name, description, created_at, updated_at FROM groups ORDER BY created_at LIMIT $1",
    )
    .bind(LIST_LIMIT)
    .fetch_all(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to list groups: {}", e)))?;

    Ok(groups)
}

/// Partial update: only non-null arguments overwrite stored columns.
pub async fn update(
    pool: &PgPool,
    group_id: Uuid,
    name: Option<&str>,
    description: Option<&str>,
) -> Result<Option<GroupRow>, ApiError> {
    let group = sqlx::query_as::<_, GroupRow>(
        r#"
        UPDATE groups
        SET
            name = COALESCE($2, name),
            description = COALESCE($3, description),
            updated_at = NOW()
        WHERE group_id = $1
        RETURNING group_id, name, description, created_at, updated_at
        "#,
    )
    .bind(group_id)
    .bind(name)
    .bind(description)
    .fetch_optional(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to update group: {}", e)))?;

    Ok(group)
}

pub async fn delete(pool: &PgPool, group_id: Uuid) -> Result<bool, ApiError> {
    let result = sqlx::query("DELETE FROM groups WHERE group_id = $1")
        .bind(group_id)
        .execute(pool)
        .await
        .map_err(|e| ApiError::Database(format!("Failed to delete group: {}", e)))?;

    Ok(result.rows_affected() == 1)
}
