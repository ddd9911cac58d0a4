//! Middleware registering the inbound `Authorization` header with the
//! [`CredentialRelay`] for the lifetime of the request future.

use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::AUTHORIZATION;
use futures_util::future::{LocalBoxFuture, Ready, ready};
use reqwest::header::{AUTHORIZATION as OUTBOUND_AUTHORIZATION, HeaderValue};
use tracing::debug;

use crate::relay::{CredentialRelay, HeaderDecorator, PassThrough, RequestDecorator};

/// Relays each request's `Authorization` header onto the outbound calls
/// made while serving it. Requests without the header run unscoped.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use deliveries::inbound::http::RelayCredentials;
///
/// let app = App::new().wrap(RelayCredentials);
/// ```
#[derive(Clone)]
pub struct RelayCredentials;

impl<S, B> Transform<S, ServiceRequest> for RelayCredentials
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RelayCredentialsMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RelayCredentialsMiddleware { service }))
    }
}

/// Service wrapper produced by [`RelayCredentials`].
pub struct RelayCredentialsMiddleware<S> {
    service: S,
}

/// Build the decorator for an inbound header value. actix and reqwest carry
/// separate `http` types, so the value crosses over as bytes.
fn decorator_for(value: &[u8]) -> Option<Arc<dyn RequestDecorator>> {
    match HeaderValue::from_bytes(value) {
        Ok(value) => Some(Arc::new(HeaderDecorator::new(
            PassThrough,
            OUTBOUND_AUTHORIZATION,
            value,
        ))),
        Err(error) => {
            debug!(%error, "authorization header not relayable");
            None
        }
    }
}

impl<S, B> Service<ServiceRequest> for RelayCredentialsMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let decorator = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| decorator_for(value.as_bytes()));
        let fut = self.service.call(req);
        match decorator {
            Some(decorator) => Box::pin(CredentialRelay::scope(decorator, fut)),
            None => Box::pin(fut),
        }
    }
}
