//! Refresh-cookie construction and clearing.
//!
//! The refresh token reaches the client exclusively through this cookie:
//! HttpOnly keeps it away from script-accessible storage, Secure +
//! SameSite=None lets cross-origin frontends send it on the auth endpoints.

use actix_web::cookie::{time::Duration, Cookie, SameSite};

/// Cookie name carrying the refresh token.
pub const REFRESH_COOKIE: &str = "jwt";

/// Builds the refresh-token cookie (1-day max-age, matching the token's own
/// lifetime).
pub fn refresh_cookie(token: &str) -> Cookie<'static> {
    Cookie::build(REFRESH_COOKIE, token.to_owned())
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .path("/")
        .max_age(Duration::days(1))
        .finish()
}

/// Builds an immediately-expiring cookie that clears the refresh token.
pub fn clear_refresh_cookie() -> Cookie<'static> {
    Cookie::build(REFRESH_COOKIE, "")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .path("/")
        .max_age(Duration::ZERO)
        .finish()
}
