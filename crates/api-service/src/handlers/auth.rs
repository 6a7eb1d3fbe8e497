//! Authentication handlers: login, token refresh, current account.

use crate::errors::ApiError;
use crate::middleware::AuthUser;
use crate::models::{AccountResponse, LoginRequest, RefreshRequest, TokenPairResponse};
use crate::repositories::users;
use crate::routes::AppState;
use crate::services::token_service;
use axum::{extract::State, Extension, Json};
use std::sync::Arc;

/// POST /login
///
/// 404 on unknown email, 400 on a wrong password, otherwise a token pair.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenPairResponse>, ApiError> {
    let pair = token_service::authenticate(
        &state.pool,
        &state.config.signing_key,
        &payload.email,
        &payload.password,
    )
    .await?;

    Ok(Json(pair))
}

/// POST /refresh
///
/// 401 on an invalid, expired, or non-refresh token.
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<TokenPairResponse>, ApiError> {
    let pair = token_service::refresh(&state.config.signing_key, &payload.refresh_token)?;

    Ok(Json(pair))
}

/// GET /me
///
/// 404 when the account behind a valid token no longer exists.
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<AccountResponse>, ApiError> {
    let user = users::get_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("account".to_string()))?;

    Ok(Json(AccountResponse {
        id: user.user_id,
        email: user.email,
    }))
}
