//! Credential service: password verification and token issuance.

use crate::errors::ApiError;
use crate::models::TokenPairResponse;
use crate::repositories::users;
use common::jwt::{self, BearerClaims, TokenKind};
use sqlx::PgPool;
use uuid::Uuid;

const ACCESS_TOKEN_TTL_SECONDS: i64 = 900; // 15 minutes
const REFRESH_TOKEN_TTL_SECONDS: i64 = 604_800; // 7 days

/// Authenticate by email and password and issue a token pair.
///
/// Unknown email is NotFound; a failed hash comparison is
/// InvalidCredentials. The two are deliberately distinct statuses.
pub async fn authenticate(
    pool: &PgPool,
    signing_key: &[u8],
    email: &str,
    password: &str,
) -> Result<TokenPairResponse, ApiError> {
    let user = users::get_by_email(pool, email)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user {}", email)))?;

    let password_matches = bcrypt::verify(password, &user.password_hash).map_err(|e| {
        tracing::error!(target: "api.token", error = %e, "Password hash verification failed");
        ApiError::Internal
    })?;

    if !password_matches {
        return Err(ApiError::InvalidCredentials);
    }

    tracing::info!(target: "api.token", user_id = %user.user_id, "User authenticated");

    issue_pair(signing_key, user.user_id)
}

/// Issue a fresh access/refresh pair bound to `user_id`.
pub fn issue_pair(signing_key: &[u8], user_id: Uuid) -> Result<TokenPairResponse, ApiError> {
    let access = BearerClaims::new(
        user_id.to_string(),
        TokenKind::Access,
        ACCESS_TOKEN_TTL_SECONDS,
    );
    let refresh = BearerClaims::new(
        user_id.to_string(),
        TokenKind::Refresh,
        REFRESH_TOKEN_TTL_SECONDS,
    );

    Ok(TokenPairResponse {
        access_token: jwt::encode_token(&access, signing_key).map_err(|_| ApiError::Internal)?,
        refresh_token: jwt::encode_token(&refresh, signing_key).map_err(|_| ApiError::Internal)?,
    })
}

/// Mint a new access token from a refresh token.
///
/// Fails Unauthorized if the token does not decode, is expired, or is an
/// access token. The refresh token is preserved, not rotated.
pub fn refresh(signing_key: &[u8], refresh_token: &str) -> Result<TokenPairResponse, ApiError> {
    let claims = jwt::decode_token(refresh_token, signing_key)
        .map_err(|_| ApiError::InvalidToken("Invalid token or expired token".to_string()))?;

    if claims.is_access() {
        return Err(ApiError::InvalidToken(
            "Only refresh tokens may be refreshed".to_string(),
        ));
    }

    let access = BearerClaims::new(claims.sub, TokenKind::Access, ACCESS_TOKEN_TTL_SECONDS);

    Ok(TokenPairResponse {
        access_token: jwt::encode_token(&access, signing_key).map_err(|_| ApiError::Internal)?,
        refresh_token: refresh_token.to_string(),
    })
}

/// Validate an access token and return its claims.
///
/// Guard for protected operations: any decode/expiry failure, or a refresh
/// token presented where an access token is required, is Unauthorized.
pub fn verify_access(signing_key: &[u8], token: &str) -> Result<BearerClaims, ApiError> {
    let claims = jwt::decode_token(token, signing_key)
        .map_err(|_| ApiError::InvalidToken("Invalid token or expired token".to_string()))?;

    if !claims.is_access() {
        return Err(ApiError::InvalidToken(
            "Access token required".to_string(),
        ));
    }

    Ok(claims)
}
