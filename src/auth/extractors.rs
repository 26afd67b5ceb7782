use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::{AppError, TOKEN_REJECTED};
use crate::models::User;

/// The user whose bearer token was accepted by `AuthMiddleware`.
///
/// Handlers that take this extractor cannot run for an unauthenticated request.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<User>().cloned() {
            Some(user) => ready(Ok(AuthenticatedUser(user))),
            None => {
                // Reached only if the middleware is missing from this route.
                log::warn!("no authenticated user on {} {}", req.method(), req.path());
                ready(Err(AppError::Unauthorized(TOKEN_REJECTED.into()).into()))
            }
        }
    }
}
