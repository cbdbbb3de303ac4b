use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// A user identity record.
///
/// `password_hash` is a bcrypt hash, never the raw secret, and is excluded
/// from every serialized response. `last_logout_time` is the global-logout
/// watermark: refresh tokens issued before it are no longer honored.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub last_logout_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
