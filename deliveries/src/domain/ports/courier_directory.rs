//! Port for resolving courier accounts held by the users service.

use async_trait::async_trait;
use service_core::define_port_error;

use crate::domain::{Courier, UserId};

define_port_error! {
    /// Failures looking up couriers.
    pub enum CourierDirectoryError {
        /// The users service refused the relayed credentials.
        Rejected { message: String } => "courier lookup rejected: {message}",
        /// The users service could not be reached or answered unexpectedly.
        Transport { message: String } => "courier lookup failed: {message}",
        /// The response body was not a user record.
        Decode { message: String } => "courier lookup returned an unreadable body: {message}",
    }
}

/// Courier lookups against the account owner.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourierDirectory: Send + Sync {
    /// The courier with `id`, or `None` when no account with that id holds
    /// the courier role.
    async fn find_courier(&self, id: UserId) -> Result<Option<Courier>, CourierDirectoryError>;
}
