use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ResponseError,
    http::{header, Method},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use sqlx::PgPool;
use std::rc::Rc;

use crate::auth::extractors::CurrentUser;
use crate::auth::token::TokenService;
use crate::error::AppError;
use crate::repo;

/// Per-request auth guard.
///
/// Resolves the bearer token to an authenticated user and stores a
/// `CurrentUser` in request extensions for downstream handlers. Requests
/// without a valid token, and valid tokens whose user row no longer exists,
/// are both rejected with 401 before any handler runs.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

/// Registration and login are the only unauthenticated endpoints behind
/// this guard.
fn is_public(req: &ServiceRequest) -> bool {
    req.method() == Method::POST
        && (req.path() == "/api/users" || req.path() == "/api/users/login")
}

/// Turns an auth failure into the same HTTP response `AppError`'s
/// `ResponseError` impl would produce, without erroring the service call.
fn reject<B>(req: ServiceRequest, err: AppError) -> ServiceResponse<EitherBody<B>> {
    req.into_response(err.error_response()).map_into_right_body()
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            if is_public(&req) {
                return service
                    .call(req)
                    .await
                    .map(ServiceResponse::map_into_left_body);
            }

            let token = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(str::to_owned);

            let token = match token {
                Some(token) => token,
                None => {
                    return Ok(reject(
                        req,
                        AppError::Unauthorized("Not authorized, no token".into()),
                    ))
                }
            };

            let tokens = match req.app_data::<web::Data<TokenService>>().cloned() {
                Some(tokens) => tokens,
                None => {
                    return Ok(reject(
                        req,
                        AppError::InternalServerError("Token service not configured".into()),
                    ))
                }
            };
            let pool = match req.app_data::<web::Data<PgPool>>().cloned() {
                Some(pool) => pool,
                None => {
                    return Ok(reject(
                        req,
                        AppError::InternalServerError("Database pool not configured".into()),
                    ))
                }
            };

            let claims = match tokens.verify(&token) {
                Ok(claims) => claims,
                Err(err) => return Ok(reject(req, err)),
            };

            // A valid token whose user row is gone must look exactly like a
            // bad token to the caller.
            match repo::users::find_by_id(&pool, claims.sub).await {
                Ok(Some(user)) => {
                    req.extensions_mut().insert(CurrentUser { id: user.id });
                    service
                        .call(req)
                        .await
                        .map(ServiceResponse::map_into_left_body)
                }
                Ok(None) => Ok(reject(
                    req,
                    AppError::Unauthorized("Not authorized, token failed".into()),
                )),
                Err(err) => Ok(reject(req, err)),
            }
        })
    }
}
