pub mod cookies;
pub mod extractors;
pub mod middleware;
pub mod password;
pub mod session;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

// Re-export necessary items
pub use cookies::{clear_refresh_cookie, refresh_cookie, REFRESH_COOKIE};
pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::{check_strength, hash_password, verify_password};
pub use session::{SessionAuthority, SessionTokens};
pub use token::{AccessClaims, RefreshClaims, TokenError, TokenKeys};

use password::strength_rule;

/// Payload for user registration. The password must satisfy the strength
/// rule up front; hashes of weak passwords never reach the store.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(custom = "strength_rule")]
    pub password: String,
}

/// Payload for a login request. Presence alone is checked here; whether the
/// credentials match is the Session Authority's call.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Payload for a password change. The new password's strength is enforced by
/// the Session Authority so the stored hash provably never changes on a weak
/// candidate.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub email: String,
    pub password: String,
    pub new_password: String,
}

/// Login response body. Only the access token travels in the body; the
/// refresh token goes out in the `jwt` cookie.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access: String,
}

/// Refresh response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub new_access_token: String,
}
