//! Driving port for login and token validation.
//!
//! Inbound adapters call this without knowing which hasher, token format, or
//! store backs it, so handler tests can substitute a mock.

use async_trait::async_trait;
use service_core::Error;

use super::IssuedToken;
use crate::domain::{Credentials, User};

/// Authentication use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Check credentials and issue a bearer token.
    async fn authenticate(&self, credentials: &Credentials) -> Result<IssuedToken, Error>;

    /// Resolve a bearer token to the account it was issued for.
    async fn authorize(&self, token: &str) -> Result<User, Error>;
}
