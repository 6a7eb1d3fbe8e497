//! User repository module for database operations.

use crate::errors::ApiError;
use crate::models::{UserRow, LIST_LIMIT};
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str =
    "user_id, email, password_hash, username, created_at, updated_at";

/// Create a new user.
///
/// Maps the unique-email constraint violation to a conflict error.
pub async fn create(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
    username: &str,
) -> Result<UserRow, ApiError> {
    let user = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (email, password_hash, username)
        VALUES ($1, $2, $3)
        RETURNING user_id, email, password_hash, username, created_at, updated_at
        "#,
    )
    .bind(email)
    .bind(password_hash)
    .bind(username)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("users_email_unique") {
            ApiError::Conflict("User already exists".to_string())
        } else {
            ApiError::Database(format!("Failed to create user: {}", e))
        }
    })?;

    Ok(user)
}

/// Get user by id.
pub async fn get_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<UserRow>, ApiError> {
    let user = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {} FROM users WHERE user_id = $1",
        USER_COLUMNS
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to fetch user by id: {}", e)))?;

    Ok(user)
}

/// Get user by email (unique).
pub async fn get_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>, ApiError> {
    let user = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {} FROM users WHERE email = $1",
        USER_COLUMNS
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to fetch user by email: {}", e)))?;

    Ok(user)
}

/// Check if an email is already registered.
pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, ApiError> {
    let exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(pool)
            .await
            .map_err(|e| ApiError::Database(format!("Failed to check email existence: {}", e)))?;

    Ok(exists.0)
}

/// List users in creation order.
pub async fn list(pool: &PgPool) -> Result<Vec<UserRow>, ApiError> {
    let users = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {} FROM users ORDER BY created_at LIMIT $1",
        USER_COLUMNS
    ))
    .bind(LIST_LIMIT)
    .fetch_all(pool)
    .await
    .map_err(|e| ApiError::Database(format!("Failed to list users: {}", e)))?;

    Ok(users)
}

/// Partial update: only non-null arguments overwrite stored columns.
///
/// Returns `None` when no user matched the id.
pub async fn update(
    pool: &PgPool,
    user_id: Uuid,
    email: Option<&str>,
    username: Option<&str>,
    password_hash: Option<&str>,
) -> Result<Option<UserRow>, ApiError> {
    let user = sqlx::query_as::<_, UserRow>(
        r#"
        UPDATE users
        SET
            email = COALESCE($2, email),
            username = COALESCE($3, username),
            password_hash = COALESCE($4, password_hash),
            updated_at = NOW()
        WHERE user_id = $1
        RETURNING user_id, email, password_hash, username, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(email)
    .bind(username)
    .bind(password_hash)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("users_email_unique") {
            ApiError::Conflict("User already exists".to_string())
        } else {
            ApiError::Database(format!("Failed to update user: {}", e))
        }
    })?;

    Ok(user)
}

/// Delete by id; `false` means nothing was deleted.
pub async fn delete(pool: &PgPool, user_id: Uuid) -> Result<bool, ApiError> {
    let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(|e| ApiError::Database(format!("Failed to delete user: {}", e)))?;

    Ok(result.rows_affected() == 1)
}
