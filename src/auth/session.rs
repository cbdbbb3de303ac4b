//!
//! # Session Authority
//!
//! The orchestrator of the session lifecycle: registration, login, logout,
//! refresh, and password change, composed from the credential verifier, the
//! token issuer/validator, the revocation deny-list, and the user store.
//!
//! Each refresh token moves `Active → Revoked` (explicit logout / password
//! change) or `Active → Expired` (natural); both are terminal. Two mechanisms
//! enforce this: the deny-list blocks an individual raw token, and the user's
//! `last_logout_time` watermark blocks every token issued before it.
//!
//! Every operation is a single linear async pipeline with exactly one
//! terminal result; there is no code path where a hashing callback and an
//! earlier validation error could both produce a response. Revocation writes
//! are awaited before an operation returns, so a client observing success is
//! guaranteed a subsequent refresh with the same raw token is rejected.

use std::sync::Arc;

use chrono::Utc;

use crate::auth::password::{check_strength, hash_password, verify_password};
use crate::auth::token::{TokenError, TokenKeys};
use crate::error::AppError;
use crate::models::User;
use crate::store::{RevocationStore, UserStore};

/// The token pair minted by a successful login. The refresh token must only
/// ever travel in the protected cookie, never a JSON body.
pub struct SessionTokens {
    pub access: String,
    pub refresh: String,
}

pub struct SessionAuthority {
    users: Arc<dyn UserStore>,
    revocations: Arc<dyn RevocationStore>,
    keys: TokenKeys,
    bcrypt_cost: u32,
}

impl SessionAuthority {
    pub fn new(
        users: Arc<dyn UserStore>,
        revocations: Arc<dyn RevocationStore>,
        keys: TokenKeys,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            users,
            revocations,
            keys,
            bcrypt_cost,
        }
    }

    /// Creates a user from already-validated input. The store's unique-email
    /// index rejects duplicates.
    pub async fn register(&self, email: &str, password: &str) -> Result<User, AppError> {
        let password_hash = hash_password(password, self.bcrypt_cost).await?;
        self.users.insert(email, &password_hash).await
    }

    /// Verifies credentials and mints an access/refresh token pair.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionTokens, AppError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::BadRequest("User does not exist!".into()))?;

        if !verify_password(password, &user.password_hash).await? {
            return Err(AppError::Unauthorized("Invalid credentials".into()));
        }

        Ok(SessionTokens {
            access: self.keys.issue_access(&user.email, user.id)?,
            refresh: self.keys.issue_refresh(user.id)?,
        })
    }

    /// Mints a new access token for a live refresh token.
    ///
    /// The deny-list is consulted before signature verification so a revoked
    /// token is always reported as revoked. The access token is allowed to be
    /// expired (that is the point of this endpoint) but must be structurally
    /// valid and belong to the same user as the refresh token.
    pub async fn refresh(
        &self,
        refresh_raw: &str,
        access_raw: Option<&str>,
    ) -> Result<String, AppError> {
        if self.revocations.is_revoked(refresh_raw).await? {
            return Err(AppError::Unauthorized("Token is in deny list".into()));
        }

        let refresh = match self.keys.verify_refresh(refresh_raw) {
            Ok(claims) => claims,
            Err(TokenError::Expired) => {
                return Err(AppError::Unauthorized("Refresh token expired".into()))
            }
            Err(TokenError::Invalid) => {
                return Err(AppError::Unauthorized("Invalid refresh token".into()))
            }
        };

        let user = self
            .users
            .find_by_id(refresh.sub)
            .await?
            .ok_or_else(|| AppError::BadRequest("User does not exist!".into()))?;

        // A global logout invalidates every refresh token issued before it,
        // even one that is unexpired and unrevoked.
        if refresh.iat < user.last_logout_time.timestamp() {
            return Err(AppError::BadRequest(
                "Refresh token created before last logout".into(),
            ));
        }

        let access_raw =
            access_raw.ok_or_else(|| AppError::BadRequest("Missing access token".into()))?;
        let access = self
            .keys
            .verify_access_ignoring_expiry(access_raw)
            .map_err(|_| AppError::BadRequest("Bad access token".into()))?;

        // One user's refresh token must never renew another user's access token.
        if access.sub != refresh.sub {
            return Err(AppError::BadRequest(
                "Mismatched access and refresh tokens".into(),
            ));
        }

        self.keys.issue_access(&access.email, refresh.sub)
    }

    /// Revokes a single refresh token (single-device logout).
    ///
    /// Expiry passes through as success: logging out an already-expired
    /// session is idempotent, and the token is revoked anyway so the deny
    /// list covers it for whatever validity it has left. `last_logout_time`
    /// is deliberately untouched; other devices stay logged in.
    pub async fn logout(&self, refresh_raw: &str) -> Result<(), AppError> {
        let claims = self
            .keys
            .verify_refresh_ignoring_expiry(refresh_raw)
            .map_err(|_| AppError::Unauthorized("Invalid refresh token".into()))?;

        self.revocations.revoke(refresh_raw, claims.exp).await
    }

    /// Changes a password and logs the user out everywhere.
    ///
    /// Advancing `last_logout_time` before the save is the mechanism that
    /// invalidates every outstanding refresh token; the presented token is
    /// additionally revoked so the very credential used for this request is
    /// blocked on the deny-list as well.
    pub async fn change_password(
        &self,
        email: &str,
        old_password: &str,
        new_password: &str,
        refresh_raw: &str,
    ) -> Result<User, AppError> {
        // Expiry of the refresh token is tolerated here: the caller is
        // re-authenticating with full credentials.
        let refresh = self
            .keys
            .verify_refresh_ignoring_expiry(refresh_raw)
            .map_err(|_| AppError::Unauthorized("Invalid refresh token".into()))?;

        let mut user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::BadRequest("User does not exist!".into()))?;

        if !verify_password(old_password, &user.password_hash).await? {
            return Err(AppError::Unauthorized("Invalid credentials".into()));
        }

        if !check_strength(new_password) {
            return Err(AppError::BadRequest("Invalid new_password".into()));
        }

        // Watermark first: one save persists the new hash and the global
        // logout together.
        user.last_logout_time = Utc::now();
        user.password_hash = hash_password(new_password, self.bcrypt_cost).await?;
        let user = self.users.save(&user).await?;

        self.revocations.revoke(refresh_raw, refresh.exp).await?;

        Ok(user)
    }
}
