use crate::errors::ApiError;
use crate::routes::AppState;
use crate::services::token_service;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;
use uuid::Uuid;

/// The authenticated caller, extracted from a verified access token and
/// stored in request extensions for downstream handlers.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

/// Authentication middleware guarding protected routes.
///
/// Extracts the Bearer token from the Authorization header, verifies it as
/// an access token, and injects the caller identity.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let auth_header = req
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::InvalidToken("Missing Authorization header".to_string()))?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        ApiError::InvalidToken("Invalid Authorization header format".to_string())
    })?;

    let claims = token_service::verify_access(&state.config.signing_key, token)?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| ApiError::InvalidToken("Invalid user identifier in token".to_string()))?;

    req.extensions_mut().insert(AuthUser { user_id });

    Ok(next.run(req).await)
}
