//!
//! # Storage capabilities
//!
//! The auth core never talks to a database directly. It is handed two
//! capabilities: a [`UserStore`] (the external user-record collaborator with
//! its unique-email index) and a [`RevocationStore`] (an expiring key-value
//! deny-list for refresh tokens). Production wires the Postgres
//! implementations from [`pg`]; tests substitute the in-memory fakes from
//! [`memory`], which take a manual clock.

pub mod memory;
pub mod pg;

use futures::future::BoxFuture;

use crate::error::AppError;
use crate::models::User;

pub use memory::{MemoryRevocationStore, MemoryUserStore};
pub use pg::{PgRevocationStore, PgUserStore};

/// Prefix for deny-list keys: `"bl_" + rawRefreshToken`.
pub fn deny_list_key(raw_token: &str) -> String {
    format!("bl_{}", raw_token)
}

/// The user-record collaborator the auth core needs.
///
/// The unique-email index behind `insert` is the sole safeguard against
/// duplicate-registration races.
pub trait UserStore: Send + Sync {
    fn find_by_email<'a>(&'a self, email: &'a str)
        -> BoxFuture<'a, Result<Option<User>, AppError>>;

    fn find_by_id(&self, id: i32) -> BoxFuture<'_, Result<Option<User>, AppError>>;

    /// Creates a user. A duplicate email fails with 400 "Email already registered".
    fn insert<'a>(
        &'a self,
        email: &'a str,
        password_hash: &'a str,
    ) -> BoxFuture<'a, Result<User, AppError>>;

    /// Persists `password_hash` and `last_logout_time` of an existing user.
    fn save<'a>(&'a self, user: &'a User) -> BoxFuture<'a, Result<User, AppError>>;
}

/// An expiring key-value deny-list of revoked refresh tokens.
///
/// An entry expires exactly when the token it revokes would have expired
/// anyway, so the deny-list never outlives its tokens and stays cost-bounded.
pub trait RevocationStore: Send + Sync {
    /// Records `raw_token` as revoked until `expires_at` (epoch seconds, the
    /// token's own `exp` claim). Idempotent.
    fn revoke<'a>(
        &'a self,
        raw_token: &'a str,
        expires_at: i64,
    ) -> BoxFuture<'a, Result<(), AppError>>;

    /// Existence check; always misses once the entry has expired.
    fn is_revoked<'a>(&'a self, raw_token: &'a str) -> BoxFuture<'a, Result<bool, AppError>>;
}
