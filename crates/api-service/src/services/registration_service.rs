//! User registration: validation, duplicate detection, password hashing.

use crate::errors::ApiError;
use crate::models::UserRow;
use crate::repositories::users;
use sqlx::PgPool;

const DEFAULT_BCRYPT_COST: u32 = 12;

/// Register a new user.
///
/// # Steps
///
/// 1. Validate email format
/// 2. Reject duplicate email with Conflict
/// 3. Hash password (bcrypt cost 12)
/// 4. Insert user
pub async fn register(
    pool: &PgPool,
    email: &str,
    password: &str,
    username: &str,
) -> Result<UserRow, ApiError> {
    if !is_valid_email(email) {
        return Err(ApiError::BadRequest("Invalid email format".to_string()));
    }

    if users::email_exists(pool, email).await? {
        return Err(ApiError::Conflict("User already exists".to_string()));
    }

    let password_hash = bcrypt::hash(password, DEFAULT_BCRYPT_COST).map_err(|e| {
        tracing::error!(target: "api.registration", error = %e, "Password hashing failed");
        ApiError::Internal
    })?;

    let user = users::create(pool, email, &password_hash, username).await?;

    tracing::info!(target: "api.registration", user_id = %user.user_id, "User registered");

    Ok(user)
}

/// Simple email validation.
///
/// Checks for basic email format: something@something.something
fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return false,
    };

    if local.is_empty() {
        return false;
    }

    // Domain must have at least one dot and no empty labels
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}
