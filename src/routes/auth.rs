use crate::{
    auth::{
        clear_refresh_cookie, refresh_cookie, AccessTokenResponse, ChangePasswordRequest,
        LoginRequest, RefreshResponse, RegisterRequest, SessionAuthority, REFRESH_COOKIE,
    },
    error::AppError,
};
use actix_web::{http::header, post, web, HttpRequest, HttpResponse, Responder};
use serde_json::json;
use validator::Validate;

/// Register a new user
///
/// Validates the email format and password strength, then creates the
/// account. Returns the created user without the password hash.
#[post("/register")]
pub async fn register(
    authority: web::Data<SessionAuthority>,
    body: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let user = authority.register(&body.email, &body.password).await?;

    Ok(HttpResponse::Created().json(user))
}

/// Login
///
/// Authenticates credentials and responds with the access token in the body.
/// The refresh token travels only in the http-only `jwt` cookie, never in
/// JSON.
#[post("/login")]
pub async fn login(
    authority: web::Data<SessionAuthority>,
    body: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    if body.email.is_empty() || body.password.is_empty() {
        return Err(AppError::BadRequest("Malformed request".into()));
    }

    let tokens = authority.login(&body.email, &body.password).await?;

    Ok(HttpResponse::Ok()
        .cookie(refresh_cookie(&tokens.refresh))
        .json(AccessTokenResponse {
            access: tokens.access,
        }))
}

/// Logout (single device)
///
/// Revokes the refresh token carried by the `jwt` cookie and clears the
/// cookie. Idempotent: an already-expired token still answers 200.
#[post("/logout")]
pub async fn logout(
    authority: web::Data<SessionAuthority>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    let cookie = req
        .cookie(REFRESH_COOKIE)
        .ok_or_else(|| AppError::BadRequest("Missing refresh token".into()))?;

    // The revocation write completes before this returns; a 200 guarantees a
    // subsequent refresh with the same raw token is rejected.
    authority.logout(cookie.value()).await?;

    Ok(HttpResponse::Ok()
        .cookie(clear_refresh_cookie())
        .json(json!({ "message": "Success; Logged out" })))
}

/// Refresh the access token
///
/// Requires the `jwt` refresh cookie and the (possibly expired) access token
/// in the Authorization header; responds with a fresh access token.
#[post("/refresh")]
pub async fn refresh(
    authority: web::Data<SessionAuthority>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    let cookie = req
        .cookie(REFRESH_COOKIE)
        .ok_or_else(|| AppError::BadRequest("Missing refresh token".into()))?;

    // Header presence is checked by the authority *after* the deny-list and
    // refresh-token checks, preserving the contract's failure order. A header
    // present without the Bearer prefix still counts as present; its value
    // then fails verification as a bad token rather than a missing one.
    let access = req
        .headers()
        .get(header::AUTHORIZATION)
        .map(|value| {
            value
                .to_str()
                .map(|v| v.strip_prefix("Bearer ").unwrap_or(v))
                .unwrap_or("")
        });

    let new_access_token = authority.refresh(cookie.value(), access).await?;

    Ok(HttpResponse::Ok().json(RefreshResponse { new_access_token }))
}

/// Change password
///
/// Registered behind `AuthMiddleware`, so a valid access token is required on
/// top of the credentials and the refresh cookie. Side effect: a global
/// logout of every outstanding refresh token.
#[post("")]
pub async fn change_password(
    authority: web::Data<SessionAuthority>,
    req: HttpRequest,
    body: web::Json<ChangePasswordRequest>,
) -> Result<impl Responder, AppError> {
    if body.email.is_empty() || body.password.is_empty() || body.new_password.is_empty() {
        return Err(AppError::BadRequest("Malformed request".into()));
    }

    let cookie = req
        .cookie(REFRESH_COOKIE)
        .ok_or_else(|| AppError::BadRequest("Missing refresh token".into()))?;

    let user = authority
        .change_password(&body.email, &body.password, &body.new_password, cookie.value())
        .await?;

    Ok(HttpResponse::Ok().cookie(clear_refresh_cookie()).json(user))
}
