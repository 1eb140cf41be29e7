use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;

/// The authenticated identity bound to the current request.
///
/// `AuthMiddleware` validates the bearer token and inserts this into request
/// extensions; handlers receive it as an extractor argument and must use it,
/// never a client-supplied id, to scope all data access.
///
/// If the identity is missing from the extensions (the middleware did not run
/// or failed to insert it), extraction fails with `AppError::Unauthorized`.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: i32,
}

impl FromRequest for CurrentUser {
    type Error = ActixError; // AppError is converted into ActixError via ResponseError
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<CurrentUser>().copied() {
            Some(user) => ready(Ok(user)),
            None => {
                // Only reachable when a route forgot the auth guard.
                // Responding with Unauthorized is the safe default.
                let err = AppError::Unauthorized(
                    "User identity not found in request. Ensure AuthMiddleware is active."
                        .to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}
