//! Caller identification and role policies for HTTP handlers.
//!
//! Handlers take [`AuthenticatedCaller`] as an argument; extraction forwards
//! the inbound `Authorization` header to the users service through the
//! [`IdentityProvider`](crate::domain::ports::IdentityProvider) port.

use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use service_core::{Error, Role};
use tracing::{debug, warn};

use super::state::HttpState;
use crate::domain::ports::IdentityError;
use crate::domain::{Caller, Delivery, UserId};

/// The raw `Authorization` header value, forwarded verbatim upstream.
pub fn authorization_header(headers: &HeaderMap) -> Result<String, Error> {
    let raw = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("missing authorization header"))?
        .to_str()
        .map_err(|_| Error::unauthorized("authorization header is not valid text"))?;
    if raw.trim().is_empty() {
        return Err(Error::unauthorized("missing authorization header"));
    }
    Ok(raw.to_owned())
}

fn map_identity_error(error: IdentityError) -> Error {
    match error {
        IdentityError::Unauthenticated { message } => {
            warn!(%message, "caller credentials rejected");
            Error::unauthorized("invalid or expired credentials")
        }
        IdentityError::Transport { message } | IdentityError::Decode { message } => {
            debug!(%message, "identity lookup failed");
            Error::internal(format!("identity lookup failed: {message}"))
        }
    }
}

/// Which deliveries a listing returns for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryScope {
    /// Every delivery.
    All,
    /// Only deliveries assigned to this courier.
    AssignedTo(UserId),
}

/// The account behind the inbound credentials.
#[derive(Debug, Clone)]
pub struct AuthenticatedCaller(pub Caller);

impl AuthenticatedCaller {
    /// Require the plain user role.
    pub fn require_user(&self) -> Result<&Caller, Error> {
        match self.0.role() {
            Role::User => Ok(&self.0),
            Role::Admin | Role::Courier => Err(self.refuse("user role required")),
        }
    }

    /// Require the administrator role.
    pub fn require_admin(&self) -> Result<&Caller, Error> {
        match self.0.role() {
            Role::Admin => Ok(&self.0),
            Role::User | Role::Courier => Err(self.refuse("administrator role required")),
        }
    }

    /// Require the courier role.
    pub fn require_courier(&self) -> Result<&Caller, Error> {
        match self.0.role() {
            Role::Courier => Ok(&self.0),
            Role::User | Role::Admin => Err(self.refuse("courier role required")),
        }
    }

    /// Deliveries an admin or courier may list.
    pub fn listing_scope(&self) -> Result<DeliveryScope, Error> {
        match self.0.role() {
            Role::Admin => Ok(DeliveryScope::All),
            Role::Courier => Ok(DeliveryScope::AssignedTo(self.0.id())),
            Role::User => Err(self.refuse("administrator or courier role required")),
        }
    }

    /// Admins see every delivery; couriers only those assigned to them.
    pub fn ensure_can_view(&self, delivery: &Delivery) -> Result<(), Error> {
        match self.0.role() {
            Role::Admin => Ok(()),
            Role::Courier if delivery.is_assigned_to(self.0.id()) => Ok(()),
            Role::Courier => Err(self.refuse("delivery is not assigned to this courier")),
            Role::User => Err(self.refuse("administrator or courier role required")),
        }
    }

    fn refuse(&self, reason: &'static str) -> Error {
        warn!(user_id = %self.0.id(), role = %self.0.role(), reason, "route refused");
        Error::forbidden(reason)
    }

    /// Unwrap the caller.
    pub fn into_inner(self) -> Caller {
        self.0
    }
}

impl FromRequest for AuthenticatedCaller {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let authorization = authorization_header(req.headers());
        Box::pin(async move {
            let authorization = authorization?;
            let state = state.ok_or_else(|| Error::internal("http state is not registered"))?;
            let caller = state
                .identity
                .identify(&authorization)
                .await
                .map_err(map_identity_error)?;
            Ok(Self(caller))
        })
    }
}
