//! In-memory store implementations with an injectable clock.
//!
//! These back the auth-flow tests (no external services) and double as a
//! single-process dev mode. The clock is a plain closure so tests can move
//! time forward and watch deny-list entries self-evict.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use futures::future::BoxFuture;

use crate::error::AppError;
use crate::models::User;
use crate::store::{deny_list_key, RevocationStore, UserStore};

pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

fn system_clock() -> Clock {
    Arc::new(|| Utc::now().timestamp())
}

/// In-memory deny-list keyed by `"bl_" + rawToken`, each entry carrying the
/// revoked token's expiry.
pub struct MemoryRevocationStore {
    entries: Mutex<HashMap<String, i64>>,
    clock: Clock,
}

impl MemoryRevocationStore {
    pub fn new() -> Self {
        Self::with_clock(system_clock())
    }

    pub fn with_clock(clock: Clock) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }
}

impl Default for MemoryRevocationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RevocationStore for MemoryRevocationStore {
    fn revoke<'a>(
        &'a self,
        raw_token: &'a str,
        expires_at: i64,
    ) -> BoxFuture<'a, Result<(), AppError>> {
        Box::pin(async move {
            // entry() keeps the first expiry on a double revoke
            self.entries
                .lock()
                .unwrap()
                .entry(deny_list_key(raw_token))
                .or_insert(expires_at);
            Ok(())
        })
    }

    fn is_revoked<'a>(&'a self, raw_token: &'a str) -> BoxFuture<'a, Result<bool, AppError>> {
        Box::pin(async move {
            let now = (self.clock)();
            let revoked = self
                .entries
                .lock()
                .unwrap()
                .get(&deny_list_key(raw_token))
                .is_some_and(|expires_at| *expires_at > now);
            Ok(revoked)
        })
    }
}

/// In-memory user store with unique-email semantics and sequential ids.
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
    next_id: AtomicI32,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            next_id: AtomicI32::new(1),
        }
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UserStore for MemoryUserStore {
    fn find_by_email<'a>(
        &'a self,
        email: &'a str,
    ) -> BoxFuture<'a, Result<Option<User>, AppError>> {
        Box::pin(async move {
            let users = self.users.lock().unwrap();
            Ok(users.iter().find(|u| u.email == email).cloned())
        })
    }

    fn find_by_id(&self, id: i32) -> BoxFuture<'_, Result<Option<User>, AppError>> {
        Box::pin(async move {
            let users = self.users.lock().unwrap();
            Ok(users.iter().find(|u| u.id == id).cloned())
        })
    }

    fn insert<'a>(
        &'a self,
        email: &'a str,
        password_hash: &'a str,
    ) -> BoxFuture<'a, Result<User, AppError>> {
        Box::pin(async move {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|u| u.email == email) {
                return Err(AppError::BadRequest("Email already registered".into()));
            }

            let now = Utc::now();
            let user = User {
                id: self.next_id.fetch_add(1, Ordering::SeqCst),
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                last_logout_time: now,
                created_at: now,
                updated_at: now,
            };
            users.push(user.clone());
            Ok(user)
        })
    }

    fn save<'a>(&'a self, user: &'a User) -> BoxFuture<'a, Result<User, AppError>> {
        Box::pin(async move {
            let mut users = self.users.lock().unwrap();
            match users.iter_mut().find(|u| u.id == user.id) {
                Some(stored) => {
                    stored.password_hash = user.password_hash.clone();
                    stored.last_logout_time = user.last_logout_time;
                    stored.updated_at = Utc::now();
                    Ok(stored.clone())
                }
                None => Err(AppError::NotFound("Record not found".into())),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicI64;

    #[actix_rt::test]
    async fn test_revocation_entry_never_outlives_token() {
        let now = Arc::new(AtomicI64::new(1_000));
        let clock_now = now.clone();
        let store =
            MemoryRevocationStore::with_clock(Arc::new(move || clock_now.load(Ordering::SeqCst)));

        store.revoke("token-a", 1_100).await.unwrap();
        assert!(store.is_revoked("token-a").await.unwrap());

        // at the token's own expiry the entry stops matching
        now.store(1_100, Ordering::SeqCst);
        assert!(!store.is_revoked("token-a").await.unwrap());

        // a token that was never revoked misses
        assert!(!store.is_revoked("token-b").await.unwrap());
    }

    #[actix_rt::test]
    async fn test_revoke_is_idempotent() {
        let store = MemoryRevocationStore::new();
        let expires_at = Utc::now().timestamp() + 3600;

        store.revoke("token-a", expires_at).await.unwrap();
        store.revoke("token-a", expires_at + 9999).await.unwrap();

        assert!(store.is_revoked("token-a").await.unwrap());
        assert_eq!(store.entries.lock().unwrap().len(), 1);
    }

    #[actix_rt::test]
    async fn test_unique_email_insert() {
        let store = MemoryUserStore::new();
        let first = store.insert("a@b.com", "hash1").await.unwrap();
        assert_eq!(first.id, 1);

        let duplicate = store.insert("a@b.com", "hash2").await;
        assert!(matches!(duplicate, Err(AppError::BadRequest(_))));

        let second = store.insert("c@d.com", "hash3").await.unwrap();
        assert_eq!(second.id, 2);
    }
}
