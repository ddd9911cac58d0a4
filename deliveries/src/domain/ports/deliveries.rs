//! Driving ports for delivery use-cases.
//!
//! Role checks happen in the HTTP adapter before these are called.

use async_trait::async_trait;
use service_core::Error;

use crate::domain::{Caller, Delivery, DeliveryId, Destination, UserId};

/// Delivery lifecycle commands.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeliveriesCommand: Send + Sync {
    /// Request a delivery to `destination` on behalf of `recipient`.
    async fn create(&self, recipient: &Caller, destination: Destination) -> Result<Delivery, Error>;

    /// Hand delivery `id` to courier `courier`.
    async fn assign_courier(&self, id: DeliveryId, courier: UserId) -> Result<Delivery, Error>;

    /// Mark delivery `id` handed over by `courier`.
    async fn complete(&self, id: DeliveryId, courier: &Caller) -> Result<Delivery, Error>;
}

/// Delivery reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeliveriesQuery: Send + Sync {
    /// Every delivery, ordered by id.
    async fn list_all(&self) -> Result<Vec<Delivery>, Error>;

    /// Deliveries assigned to `courier`, ordered by id.
    async fn list_for_courier(&self, courier: UserId) -> Result<Vec<Delivery>, Error>;

    /// One delivery; `invalid_request` when the id is unknown.
    async fn find(&self, id: DeliveryId) -> Result<Delivery, Error>;
}
