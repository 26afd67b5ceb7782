use std::rc::Rc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::{header, Method},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::Authenticator;
use crate::error::{AppError, TOKEN_REJECTED};

/// Requires a valid bearer token for every non-read request in the scope it
/// wraps. On success the token's `User` is stored in the request extensions
/// for [`AuthenticatedUser`](crate::auth::extractors::AuthenticatedUser).
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
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

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Listing tasks is public.
        if is_read_only(req.method()) {
            return Box::pin(self.service.call(req));
        }

        let service = Rc::clone(&self.service);
        let authenticator = req.app_data::<web::Data<Authenticator>>().cloned();
        let token = bearer_token(&req).map(str::to_owned);

        Box::pin(async move {
            let authenticator = authenticator.ok_or_else(|| {
                AppError::InternalServerError("Authenticator is not configured".into())
            })?;
            let token = token.ok_or_else(|| AppError::Unauthorized(TOKEN_REJECTED.into()))?;

            let user = authenticator.validate_token(&token).await?;
            req.extensions_mut().insert(user);
            service.call(req).await
        })
    }
}

fn is_read_only(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD || *method == Method::OPTIONS
}

fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim_start().split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
}
