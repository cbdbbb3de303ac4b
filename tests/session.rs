//! Session-lifecycle tests running the Session Authority against the
//! in-memory stores, with no external services.

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use taskwarden::auth::{AccessClaims, RefreshClaims, SessionAuthority, SessionTokens, TokenKeys};
use taskwarden::error::AppError;
use taskwarden::store::{MemoryRevocationStore, MemoryUserStore};

const ACCESS_SECRET: &str = "access-secret-for-tests";
const REFRESH_SECRET: &str = "refresh-secret-for-tests";
// bcrypt's minimum cost; tests don't need the production factor
const TEST_COST: u32 = 4;

const EMAIL: &str = "a@b.com";
const PASSWORD: &str = "Abcdef1!";

fn authority() -> SessionAuthority {
    SessionAuthority::new(
        Arc::new(MemoryUserStore::new()),
        Arc::new(MemoryRevocationStore::new()),
        TokenKeys::new(ACCESS_SECRET, REFRESH_SECRET),
        TEST_COST,
    )
}

async fn registered_login(authority: &SessionAuthority) -> SessionTokens {
    authority.register(EMAIL, PASSWORD).await.unwrap();
    authority.login(EMAIL, PASSWORD).await.unwrap()
}

/// Fabricates a refresh token with a chosen issued-at, letting tests reach
/// back in time past the logout watermark.
fn refresh_issued_at(sub: i32, iat: i64, exp: i64) -> String {
    encode(
        &Header::default(),
        &RefreshClaims { sub, iat, exp },
        &EncodingKey::from_secret(REFRESH_SECRET.as_bytes()),
    )
    .unwrap()
}

/// Fabricates an access token with chosen timestamps, letting tests produce
/// one that is already expired.
fn access_issued_at(sub: i32, email: &str, iat: i64, exp: i64) -> String {
    encode(
        &Header::default(),
        &AccessClaims {
            sub,
            email: email.to_string(),
            iat,
            exp,
        },
        &EncodingKey::from_secret(ACCESS_SECRET.as_bytes()),
    )
    .unwrap()
}

fn unauthorized_message(result: Result<String, AppError>) -> String {
    match result {
        Err(AppError::Unauthorized(msg)) => msg,
        other => panic!("expected Unauthorized, got {:?}", other.map(|_| "Ok")),
    }
}

fn bad_request_message(result: Result<String, AppError>) -> String {
    match result {
        Err(AppError::BadRequest(msg)) => msg,
        other => panic!("expected BadRequest, got {:?}", other.map(|_| "Ok")),
    }
}

#[actix_rt::test]
async fn login_issues_tokens_and_refresh_renews_access() {
    let authority = authority();
    let tokens = registered_login(&authority).await;

    let keys = TokenKeys::new(ACCESS_SECRET, REFRESH_SECRET);
    let access_claims = keys.verify_access(&tokens.access).unwrap();
    assert_eq!(access_claims.email, EMAIL);
    let refresh_claims = keys.verify_refresh(&tokens.refresh).unwrap();
    assert_eq!(refresh_claims.sub, access_claims.sub);

    let renewed = authority
        .refresh(&tokens.refresh, Some(&tokens.access))
        .await
        .unwrap();
    let renewed_claims = keys.verify_access(&renewed).unwrap();
    assert_eq!(renewed_claims.sub, access_claims.sub);
    assert_eq!(renewed_claims.email, EMAIL);
}

#[actix_rt::test]
async fn login_failures() {
    let authority = authority();
    authority.register(EMAIL, PASSWORD).await.unwrap();

    match authority.login("nobody@example.com", PASSWORD).await {
        Err(AppError::BadRequest(msg)) => assert_eq!(msg, "User does not exist!"),
        other => panic!("expected BadRequest, got {:?}", other.is_ok()),
    }

    match authority.login(EMAIL, "Wrongpass1!").await {
        Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Invalid credentials"),
        other => panic!("expected Unauthorized, got {:?}", other.is_ok()),
    }
}

#[actix_rt::test]
async fn duplicate_registration_fails() {
    let authority = authority();
    authority.register(EMAIL, PASSWORD).await.unwrap();

    match authority.register(EMAIL, PASSWORD).await {
        Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Email already registered"),
        other => panic!("expected BadRequest, got {:?}", other.is_ok()),
    }
}

#[actix_rt::test]
async fn logout_revokes_the_refresh_token() {
    let authority = authority();
    let tokens = registered_login(&authority).await;

    authority.logout(&tokens.refresh).await.unwrap();

    // the token has not expired, yet refresh is rejected via the deny-list
    let msg = unauthorized_message(authority.refresh(&tokens.refresh, Some(&tokens.access)).await);
    assert_eq!(msg, "Token is in deny list");

    // logging out again is not an error
    authority.logout(&tokens.refresh).await.unwrap();
}

#[actix_rt::test]
async fn logout_of_an_expired_session_is_idempotent() {
    let authority = authority();
    registered_login(&authority).await;

    let now = Utc::now().timestamp();
    let expired = refresh_issued_at(1, now - 7200, now - 3600);

    authority.logout(&expired).await.unwrap();
    authority.logout(&expired).await.unwrap();

    // structurally invalid tokens are still rejected
    match authority.logout("garbage.token.value").await {
        Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Invalid refresh token"),
        other => panic!("expected Unauthorized, got {:?}", other.is_ok()),
    }
}

#[actix_rt::test]
async fn refresh_rejects_expired_and_invalid_tokens() {
    let authority = authority();
    let tokens = registered_login(&authority).await;

    let now = Utc::now().timestamp();
    let expired = refresh_issued_at(1, now - 7200, now - 3600);
    let msg = unauthorized_message(authority.refresh(&expired, Some(&tokens.access)).await);
    assert_eq!(msg, "Refresh token expired");

    let msg =
        unauthorized_message(authority.refresh("garbage.token", Some(&tokens.access)).await);
    assert_eq!(msg, "Invalid refresh token");
}

#[actix_rt::test]
async fn refresh_requires_a_structurally_valid_access_token() {
    let authority = authority();
    let tokens = registered_login(&authority).await;

    let msg = bad_request_message(authority.refresh(&tokens.refresh, None).await);
    assert_eq!(msg, "Missing access token");

    let msg =
        bad_request_message(authority.refresh(&tokens.refresh, Some("garbage.token")).await);
    assert_eq!(msg, "Bad access token");
}

#[actix_rt::test]
async fn refresh_accepts_an_expired_access_token() {
    let authority = authority();
    let tokens = registered_login(&authority).await;
    let keys = TokenKeys::new(ACCESS_SECRET, REFRESH_SECRET);
    let sub = keys.verify_refresh(&tokens.refresh).unwrap().sub;

    // expired two hours ago, well past any verification leeway
    let now = Utc::now().timestamp();
    let expired_access = access_issued_at(sub, EMAIL, now - 7200, now - 3600);
    assert!(keys.verify_access(&expired_access).is_err());

    // the expired access token is the normal case at this endpoint
    let renewed = authority
        .refresh(&tokens.refresh, Some(&expired_access))
        .await
        .unwrap();
    let claims = keys.verify_access(&renewed).unwrap();
    assert_eq!(claims.sub, sub);
    assert_eq!(claims.email, EMAIL);
}

#[actix_rt::test]
async fn refresh_rejects_mismatched_token_pairs() {
    let authority = authority();
    authority.register("one@example.com", PASSWORD).await.unwrap();
    authority.register("two@example.com", PASSWORD).await.unwrap();
    let one = authority.login("one@example.com", PASSWORD).await.unwrap();
    let two = authority.login("two@example.com", PASSWORD).await.unwrap();

    // both tokens individually valid and unexpired, but for different users
    let msg = bad_request_message(authority.refresh(&one.refresh, Some(&two.access)).await);
    assert_eq!(msg, "Mismatched access and refresh tokens");
}

#[actix_rt::test]
async fn change_password_invalidates_all_outstanding_refresh_tokens() {
    let authority = authority();
    let tokens = registered_login(&authority).await;
    let keys = TokenKeys::new(ACCESS_SECRET, REFRESH_SECRET);
    let sub = keys.verify_refresh(&tokens.refresh).unwrap().sub;

    // a second session, issued a minute ago on "another device"
    let now = Utc::now().timestamp();
    let other_device = refresh_issued_at(sub, now - 60, now + 24 * 3600);

    authority
        .change_password(EMAIL, PASSWORD, "Newpass2@", &tokens.refresh)
        .await
        .unwrap();

    // the presented token hits the deny-list
    let msg = unauthorized_message(authority.refresh(&tokens.refresh, Some(&tokens.access)).await);
    assert_eq!(msg, "Token is in deny list");

    // every other token is superseded by the watermark
    let msg = bad_request_message(authority.refresh(&other_device, Some(&tokens.access)).await);
    assert_eq!(msg, "Refresh token created before last logout");

    // only the new password logs in
    assert!(authority.login(EMAIL, PASSWORD).await.is_err());
    authority.login(EMAIL, "Newpass2@").await.unwrap();
}

#[actix_rt::test]
async fn weak_new_password_leaves_the_stored_hash_unchanged() {
    let authority = authority();
    let tokens = registered_login(&authority).await;

    // missing a digit
    match authority
        .change_password(EMAIL, PASSWORD, "Weakpass!", &tokens.refresh)
        .await
    {
        Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Invalid new_password"),
        other => panic!("expected BadRequest, got {:?}", other.is_ok()),
    }

    // the old password still works, so the hash was not touched
    authority.login(EMAIL, PASSWORD).await.unwrap();

    // and no watermark was advanced: the session still refreshes
    authority
        .refresh(&tokens.refresh, Some(&tokens.access))
        .await
        .unwrap();
}

#[actix_rt::test]
async fn change_password_rejects_wrong_credentials() {
    let authority = authority();
    let tokens = registered_login(&authority).await;

    match authority
        .change_password(EMAIL, "Wrongpass1!", "Newpass2@", &tokens.refresh)
        .await
    {
        Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Invalid credentials"),
        other => panic!("expected Unauthorized, got {:?}", other.is_ok()),
    }

    match authority
        .change_password(EMAIL, PASSWORD, "Newpass2@", "garbage.token")
        .await
    {
        Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Invalid refresh token"),
        other => panic!("expected Unauthorized, got {:?}", other.is_ok()),
    }
}
