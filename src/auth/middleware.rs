use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::token::TokenKeys;
use crate::error::AppError;

/// Guards a scope with access-token authentication.
///
/// Verifies the `Authorization: Bearer` access token (strictly — expiry is
/// not tolerated here) and inserts the decoded [`AccessClaims`] into request
/// extensions for the [`AuthenticatedUser`] extractor. Access tokens are
/// never checked against the revocation deny-list; their short lifetime
/// bounds the exposure window instead.
///
/// Rejections are rendered to responses here rather than propagated as
/// service errors, so the guard behaves identically under a real server and
/// under `test::init_service`.
///
/// [`AccessClaims`]: crate::auth::token::AccessClaims
/// [`AuthenticatedUser`]: crate::auth::extractors::AuthenticatedUser
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let keys = match req.app_data::<web::Data<TokenKeys>>() {
            Some(keys) => keys.clone(),
            None => {
                let err = AppError::Configuration("TokenKeys app data not registered".into());
                return Box::pin(ready(Ok(reject(req, err))));
            }
        };

        match req.headers().get(header::AUTHORIZATION) {
            Some(value) => {
                // A header without the Bearer prefix (or non-UTF-8) is a bad
                // token, not a missing one.
                let token = value
                    .to_str()
                    .map(|v| v.strip_prefix("Bearer ").unwrap_or(v))
                    .unwrap_or("");
                match keys.verify_access(token) {
                    Ok(claims) => {
                        req.extensions_mut().insert(claims);
                        let fut = self.service.call(req);
                        Box::pin(async move { fut.await.map(|res| res.map_into_left_body()) })
                    }
                    Err(_) => {
                        let err = AppError::BadRequest("Bad access token".into());
                        Box::pin(ready(Ok(reject(req, err))))
                    }
                }
            }
            None => {
                let err = AppError::BadRequest("Missing access token".into());
                Box::pin(ready(Ok(reject(req, err))))
            }
        }
    }
}

fn reject<B>(req: ServiceRequest, err: AppError) -> ServiceResponse<EitherBody<B>> {
    let response = err.error_response().map_into_right_body();
    req.into_response(response)
}
