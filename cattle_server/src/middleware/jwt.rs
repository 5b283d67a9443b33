//! Bearer token middleware.
//!
//! If a request carries an `Authorization: Bearer <token>` header, the token is verified and the claims are stored in
//! the request extensions, where the [`JwtClaims`] extractor and the ACL middleware find them. An invalid or expired
//! token is rejected with a 401. Requests without the header pass through untouched; routes that need an identity
//! fail when they try to extract the claims.

use std::{pin::Pin, rc::Rc};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error,
    HttpMessage,
};
use futures::{
    future::{ok, Ready},
    Future,
};
use log::*;

use crate::{
    auth::{JwtClaims, TokenVerifier},
    errors::{AuthError, ServerError},
};

pub struct JwtMiddlewareFactory {
    verifier: TokenVerifier,
}

impl JwtMiddlewareFactory {
    pub fn new(verifier: TokenVerifier) -> Self {
        Self { verifier }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = JwtMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(JwtMiddlewareService { verifier: self.verifier.clone(), service: Rc::new(service) })
    }
}

pub struct JwtMiddlewareService<S> {
    verifier: TokenVerifier,
    service: Rc<S>,
}

fn bearer_claims(req: &ServiceRequest, verifier: &TokenVerifier) -> Result<Option<JwtClaims>, AuthError> {
    let Some(header) = req.headers().get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = header.to_str().map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::PoorlyFormattedToken("Expected a bearer token".into()))?;
    verifier.verify(token.trim()).map(Some)
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let claims = bearer_claims(&req, &self.verifier);
        Box::pin(async move {
            match claims {
                Ok(Some(claims)) => {
                    trace!("💻️ Request to {} by {}", req.path(), claims.sub);
                    req.extensions_mut().insert(claims);
                },
                Ok(None) => trace!("💻️ Anonymous request to {}", req.path()),
                Err(e) => {
                    debug!("💻️ Rejecting request to {}. {e}", req.path());
                    return Err(ServerError::AuthenticationError(e).into());
                },
            }
            service.call(req).await
        })
    }
}
