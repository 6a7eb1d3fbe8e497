//! JWT utilities shared across Convene services.
//!
//! Provides the bearer token claims model and HS256 encode/decode wrappers:
//! - Size limits for DoS prevention
//! - Access/refresh token kind tagging
//! - Claims structure with redacted Debug output
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - Only HS256 is accepted during validation
//! - Generic error messages prevent information leakage
//! - The `sub` field in claims is redacted in Debug output

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum allowed JWT size in bytes (8KB).
///
/// Tokens larger than this are rejected BEFORE any base64 decoding or
/// signature verification, bounding the work an oversized token can cause.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

/// Whether a bearer token grants API access or only the right to mint a
/// fresh access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Bearer token claims.
///
/// # Fields
///
/// - `sub`: Subject (user identifier)
/// - `exp`: Expiration timestamp (Unix epoch seconds)
/// - `iat`: Issued-at timestamp (Unix epoch seconds)
/// - `kind`: Access or refresh token
///
/// # Security
///
/// The `sub` field is redacted in Debug output to prevent accidental logging
/// of user identifiers.
#[derive(Clone, Serialize, Deserialize)]
pub struct BearerClaims {
    /// Subject (user identifier) - redacted in Debug output.
    pub sub: String,

    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,

    /// Issued-at timestamp (Unix epoch seconds).
    pub iat: i64,

    /// Access or refresh token.
    pub kind: TokenKind,
}

impl fmt::Debug for BearerClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerClaims")
            .field("sub", &"[REDACTED]")
            .field("exp", &self.exp)
            .field("iat", &self.iat)
            .field("kind", &self.kind)
            .finish()
    }
}

impl BearerClaims {
    /// Creates claims for `sub` valid for `ttl_seconds` from now.
    #[must_use]
    pub fn new(sub: String, kind: TokenKind, ttl_seconds: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub,
            exp: now + ttl_seconds,
            iat: now,
            kind,
        }
    }

    /// Whether these claims belong to an access token.
    #[must_use]
    pub fn is_access(&self) -> bool {
        self.kind == TokenKind::Access
    }
}

/// Errors that can occur while signing or validating a token.
///
/// Validation error messages are intentionally generic to prevent
/// information leakage; details are logged at debug level.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtError {
    /// Token size exceeds maximum allowed.
    #[error("The token is invalid or expired")]
    TokenTooLarge,

    /// Token failed structural or signature validation.
    #[error("The token is invalid or expired")]
    Malformed,

    /// Token `exp` is in the past.
    #[error("The token is invalid or expired")]
    Expired,

    /// Token could not be signed.
    #[error("Token signing failed")]
    Signing,
}

/// Sign `claims` with `key` using HS256.
///
/// # Errors
///
/// Returns `JwtError::Signing` if the underlying encoder fails.
pub fn encode_token(claims: &BearerClaims, key: &[u8]) -> Result<String, JwtError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(key),
    )
    .map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to sign token");
        JwtError::Signing
    })
}

/// Validate `token` against `key` and return its claims.
///
/// The token size is checked before any parsing. Expiry is enforced with
/// the validator's default leeway.
///
/// # Errors
///
/// - `TokenTooLarge` - token exceeds [`MAX_JWT_SIZE_BYTES`]
/// - `Expired` - `exp` is in the past
/// - `Malformed` - any other structural or signature failure
pub fn decode_token(token: &str, key: &[u8]) -> Result<BearerClaims, JwtError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(JwtError::TokenTooLarge);
    }

    let validation = Validation::new(Algorithm::HS256);

    decode::<BearerClaims>(token, &DecodingKey::from_secret(key), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(target: "common.jwt", error = %e, "Token validation failed");
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Malformed,
            }
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"0123456789abcdef0123456789abcdef";

    #[test]
    fn test_roundtrip_access_token() {
        let claims = BearerClaims::new("user-1".to_string(), TokenKind::Access, 900);
        let token = encode_token(&claims, KEY).unwrap();

        let decoded = decode_token(&token, KEY).unwrap();
        assert_eq!(decoded.sub, "user-1");
        assert_eq!(decoded.kind, TokenKind::Access);
        assert!(decoded.is_access());
        assert_eq!(decoded.exp, claims.exp);
        assert_eq!(decoded.iat, claims.iat);
    }

    #[test]
    fn test_roundtrip_refresh_token() {
        let claims = BearerClaims::new("user-2".to_string(), TokenKind::Refresh, 604_800);
        let token = encode_token(&claims, KEY).unwrap();

        let decoded = decode_token(&token, KEY).unwrap();
        assert_eq!(decoded.kind, TokenKind::Refresh);
        assert!(!decoded.is_access());
    }

    #[test]
    fn test_expired_token_rejected() {
        // Well past the validator's default leeway
        let now = chrono::Utc::now().timestamp();
        let claims = BearerClaims {
            sub: "user-3".to_string(),
            exp: now - 3600,
            iat: now - 7200,
            kind: TokenKind::Access,
        };
        let token = encode_token(&claims, KEY).unwrap();

        let result = decode_token(&token, KEY);
        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let claims = BearerClaims::new("user-4".to_string(), TokenKind::Access, 900);
        let token = encode_token(&claims, KEY).unwrap();

        let result = decode_token(&token, b"another-key-another-key-another!");
        assert!(matches!(result, Err(JwtError::Malformed)));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let result = decode_token("not-a-jwt", KEY);
        assert!(matches!(result, Err(JwtError::Malformed)));
    }

    #[test]
    fn test_oversized_token_rejected() {
        let oversized = "a".repeat(MAX_JWT_SIZE_BYTES + 1);
        let result = decode_token(&oversized, KEY);
        assert!(matches!(result, Err(JwtError::TokenTooLarge)));
    }

    #[test]
    fn test_token_kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&TokenKind::Access).unwrap(),
            "\"access\""
        );
        assert_eq!(
            serde_json::to_string(&TokenKind::Refresh).unwrap(),
            "\"refresh\""
        );
    }

    #[test]
    fn test_debug_redacts_sub() {
        let claims = BearerClaims::new("secret-user-id".to_string(), TokenKind::Access, 900);
        let debug_str = format!("{claims:?}");

        assert!(!debug_str.contains("secret-user-id"));
        assert!(debug_str.contains("[REDACTED]"));
    }

    #[test]
    fn test_generic_error_messages() {
        // All validation failures surface the same message
        assert_eq!(
            JwtError::TokenTooLarge.to_string(),
            JwtError::Malformed.to_string()
        );
        assert_eq!(
            JwtError::Expired.to_string(),
            JwtError::Malformed.to_string()
        );
    }
}
