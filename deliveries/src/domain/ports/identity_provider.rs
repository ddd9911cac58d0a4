//! Port for resolving inbound credentials into a caller identity.

use async_trait::async_trait;
use service_core::define_port_error;

use crate::domain::Caller;

define_port_error! {
    /// Failures resolving credentials.
    pub enum IdentityError {
        /// The credentials were not accepted.
        Unauthenticated { message: String } => "credentials rejected: {message}",
        /// The identity service could not be reached.
        Transport { message: String } => "identity lookup failed: {message}",
        /// The identity response was unreadable.
        Decode { message: String } => "identity lookup returned an unreadable body: {message}",
    }
}

/// Resolves an `Authorization` header value into the account behind it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Identify the caller presenting `authorization`, forwarded verbatim.
    async fn identify(&self, authorization: &str) -> Result<Caller, IdentityError>;
}
