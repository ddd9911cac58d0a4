//! Driving ports for account administration.

use async_trait::async_trait;
use service_core::Error;

use crate::domain::{Credentials, User, UserId};

/// Account creation use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountsCommand: Send + Sync {
    /// Self-service signup; the account gets the `user` role.
    async fn sign_up(&self, credentials: &Credentials) -> Result<User, Error>;

    /// Admin-issued courier account.
    async fn create_courier(&self, credentials: &Credentials) -> Result<User, Error>;
}

/// Courier lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CouriersQuery: Send + Sync {
    /// Every courier account, ordered by id.
    async fn list_couriers(&self) -> Result<Vec<User>, Error>;

    /// The courier with `id`; `not_found` when absent or not a courier.
    async fn find_courier(&self, id: UserId) -> Result<User, Error>;
}
