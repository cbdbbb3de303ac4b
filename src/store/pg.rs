use futures::future::BoxFuture;
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::User;
use crate::store::{deny_list_key, RevocationStore, UserStore};

const USER_COLUMNS: &str = "id, email, password_hash, last_logout_time, created_at, updated_at";

/// Postgres-backed user store. The `users.email` unique index enforces the
/// one-user-per-email invariant.
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl UserStore for PgUserStore {
    fn find_by_email<'a>(
        &'a self,
        email: &'a str,
    ) -> BoxFuture<'a, Result<Option<User>, AppError>> {
        Box::pin(async move {
            let user = sqlx::query_as::<_, User>(&format!(
                "SELECT {} FROM users WHERE email = $1",
                USER_COLUMNS
            ))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
            Ok(user)
        })
    }

    fn find_by_id(&self, id: i32) -> BoxFuture<'_, Result<Option<User>, AppError>> {
        Box::pin(async move {
            let user = sqlx::query_as::<_, User>(&format!(
                "SELECT {} FROM users WHERE id = $1",
                USER_COLUMNS
            ))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
            Ok(user)
        })
    }

    fn insert<'a>(
        &'a self,
        email: &'a str,
        password_hash: &'a str,
    ) -> BoxFuture<'a, Result<User, AppError>> {
        Box::pin(async move {
            let user = sqlx::query_as::<_, User>(&format!(
                "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING {}",
                USER_COLUMNS
            ))
            .bind(email)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    AppError::BadRequest("Email already registered".into())
                }
                _ => AppError::from(e),
            })?;
            Ok(user)
        })
    }

    fn save<'a>(&'a self, user: &'a User) -> BoxFuture<'a, Result<User, AppError>> {
        Box::pin(async move {
            let user = sqlx::query_as::<_, User>(&format!(
                "UPDATE users SET password_hash = $1, last_logout_time = $2, updated_at = now() \
                 WHERE id = $3 RETURNING {}",
                USER_COLUMNS
            ))
            .bind(&user.password_hash)
            .bind(user.last_logout_time)
            .bind(user.id)
            .fetch_one(&self.pool)
            .await?;
            Ok(user)
        })
    }
}

/// Postgres-backed deny-list. Entries carry the revoked token's own expiry;
/// `is_revoked` filters on it, so an entry stops matching exactly when the
/// token would have expired anyway. `ON CONFLICT DO NOTHING` makes revocation
/// idempotent.
pub struct PgRevocationStore {
    pool: PgPool,
}

impl PgRevocationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl RevocationStore for PgRevocationStore {
    fn revoke<'a>(
        &'a self,
        raw_token: &'a str,
        expires_at: i64,
    ) -> BoxFuture<'a, Result<(), AppError>> {
        Box::pin(async move {
            sqlx::query(
                "INSERT INTO revoked_tokens (token_key, token, expires_at) \
                 VALUES ($1, $2, to_timestamp($3)) \
                 ON CONFLICT (token_key) DO NOTHING",
            )
            .bind(deny_list_key(raw_token))
            .bind(raw_token)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;

            // Naturally expired entries carry no information anymore; sweep
            // them opportunistically so the table stays bounded.
            sqlx::query("DELETE FROM revoked_tokens WHERE expires_at <= now()")
                .execute(&self.pool)
                .await?;

            Ok(())
        })
    }

    fn is_revoked<'a>(&'a self, raw_token: &'a str) -> BoxFuture<'a, Result<bool, AppError>> {
        Box::pin(async move {
            let revoked = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM revoked_tokens \
                 WHERE token_key = $1 AND expires_at > now())",
            )
            .bind(deny_list_key(raw_token))
            .fetch_one(&self.pool)
            .await?;
            Ok(revoked)
        })
    }
}
