//! Bearer authentication for HTTP handlers.
//!
//! Handlers take [`AuthenticatedUser`] as an argument; extraction parses the
//! `Authorization` header and resolves the token through the
//! [`Authenticator`](crate::domain::ports::Authenticator) port.

use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use service_core::{Error, Role};
use tracing::warn;

use super::state::HttpState;
use crate::domain::User;

const BEARER: &str = "bearer";

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// The scheme is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Result<String, Error> {
    let raw = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?
        .to_str()
        .map_err(|_| Error::unauthorized("authorization header is not valid text"))?;
    let (scheme, token) = raw
        .trim()
        .split_once(' ')
        .ok_or_else(|| Error::unauthorized("malformed authorization header"))?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case(BEARER) || token.is_empty() {
        return Err(Error::unauthorized("malformed authorization header"));
    }
    Ok(token.to_owned())
}

/// The account behind a valid bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl AuthenticatedUser {
    /// Require the administrator role.
    pub fn require_admin(&self) -> Result<&User, Error> {
        match self.0.role() {
            Role::Admin => Ok(&self.0),
            Role::User | Role::Courier => {
                warn!(user_id = %self.0.id(), role = %self.0.role(), "admin route refused");
                Err(Error::forbidden("administrator role required"))
            }
        }
    }

    /// Unwrap the account.
    pub fn into_inner(self) -> User {
        self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let token = bearer_token(req.headers());
        Box::pin(async move {
            let state = state.ok_or_else(|| Error::internal("http state is not registered"))?;
            let user = state.auth.authorize(&token?).await?;
            Ok(Self(user))
        })
    }
}
