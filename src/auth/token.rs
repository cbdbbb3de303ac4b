//!
//! # Token issuance and validation
//!
//! Two token classes, two signing secrets: a leaked access-signing key must
//! not be able to forge refresh tokens, and vice versa. Access tokens are
//! short-lived bearer credentials carrying `{email, sub}`; refresh tokens are
//! longer-lived and carry only `sub`. Claims are typed structs matched
//! exhaustively at verification sites, never dynamic payloads.
//!
//! Validation distinguishes [`TokenError::Expired`] from
//! [`TokenError::Invalid`] so callers can tolerate expiry where the flow
//! allows it (idempotent logout, the access half of the refresh handshake)
//! while rejecting anything structurally wrong.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Access token lifetime: 100 minutes.
pub const ACCESS_TOKEN_MINUTES: i64 = 100;
/// Refresh token lifetime: 1 day.
pub const REFRESH_TOKEN_DAYS: i64 = 1;

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// The user's id.
    pub sub: i32,
    /// The user's email address.
    pub email: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// Claims carried by a refresh token. No email: refresh tokens only ever
/// mint new access tokens for the id they were issued to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: i32,
    pub iat: i64,
    pub exp: i64,
}

/// Why a token failed verification. Signature mismatch, malformed structure,
/// or wrong algorithm are `Invalid`; expiry alone is `Expired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    Expired,
    Invalid,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        match error.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        }
    }
}

/// The signing secrets for both token classes, built from config and shared
/// through app data. HS256 with the default header throughout.
#[derive(Clone)]
pub struct TokenKeys {
    access_secret: String,
    refresh_secret: String,
}

impl TokenKeys {
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
        }
    }

    /// Issues an access token with claims `{email, sub, iat=now}` expiring in
    /// 100 minutes. An empty email is a broken caller contract, not a client
    /// error.
    pub fn issue_access(&self, email: &str, id: i32) -> Result<String, AppError> {
        if email.is_empty() {
            return Err(AppError::Configuration(
                "access token requires an email claim".into(),
            ));
        }

        let now = Utc::now();
        let claims = AccessClaims {
            sub: id,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(ACCESS_TOKEN_MINUTES)).timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.access_secret.as_bytes()),
        )
        .map_err(|e| AppError::Configuration(format!("Failed to sign access token: {}", e)))
    }

    /// Issues a refresh token with claims `{sub, iat=now}` expiring in 1 day,
    /// signed with the refresh secret.
    pub fn issue_refresh(&self, id: i32) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = RefreshClaims {
            sub: id,
            iat: now.timestamp(),
            exp: (now + Duration::days(REFRESH_TOKEN_DAYS)).timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.refresh_secret.as_bytes()),
        )
        .map_err(|e| AppError::Configuration(format!("Failed to sign refresh token: {}", e)))
    }

    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(self.access_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(TokenError::from)
    }

    /// Verifies an access token without checking `exp`. Used only by the
    /// refresh handshake, where the access token legitimately arrives expired
    /// and is needed for its `email` and `sub` claims.
    pub fn verify_access_ignoring_expiry(&self, token: &str) -> Result<AccessClaims, TokenError> {
        decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(self.access_secret.as_bytes()),
            &ignore_expiry(),
        )
        .map(|data| data.claims)
        .map_err(|_| TokenError::Invalid)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        decode::<RefreshClaims>(
            token,
            &DecodingKey::from_secret(self.refresh_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(TokenError::from)
    }

    /// Verifies a refresh token without checking `exp`. Used where an
    /// expired-but-structurally-valid token must still yield its claims for
    /// revocation bookkeeping (idempotent logout) or where the caller is
    /// re-authenticating with credentials anyway (password change).
    pub fn verify_refresh_ignoring_expiry(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        decode::<RefreshClaims>(
            token,
            &DecodingKey::from_secret(self.refresh_secret.as_bytes()),
            &ignore_expiry(),
        )
        .map(|data| data.claims)
        .map_err(|_| TokenError::Invalid)
    }
}

fn ignore_expiry() -> Validation {
    let mut validation = Validation::default();
    validation.validate_exp = false;
    validation
}
