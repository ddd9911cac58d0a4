//! Port abstraction for delivery persistence adapters and their errors.

use async_trait::async_trait;
use service_core::define_port_error;

use crate::domain::{Delivery, DeliveryId, NewDelivery, UserId};

define_port_error! {
    /// Persistence errors raised by delivery repository adapters.
    pub enum DeliveryRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "delivery repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "delivery repository query failed: {message}",
    }
}

/// Storage of deliveries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeliveryRepository: Send + Sync {
    /// Insert a delivery with status `created` and version 1.
    async fn insert(&self, delivery: &NewDelivery) -> Result<Delivery, DeliveryRepositoryError>;

    /// Fetch a delivery by identifier.
    async fn find_by_id(&self, id: DeliveryId) -> Result<Option<Delivery>, DeliveryRepositoryError>;

    /// Every delivery, ordered by id.
    async fn list_all(&self) -> Result<Vec<Delivery>, DeliveryRepositoryError>;

    /// Deliveries currently assigned to `courier`, ordered by id.
    async fn list_by_courier(&self, courier: UserId)
    -> Result<Vec<Delivery>, DeliveryRepositoryError>;

    /// Write status, courier and `updated_at` of `delivery` in one row
    /// update, provided the stored version still equals
    /// `delivery.version()`.
    ///
    /// Returns the stored delivery with its version incremented, or `None`
    /// when another writer got there first. A losing call leaves the row
    /// untouched.
    async fn update_if_version(
        &self,
        delivery: &Delivery,
    ) -> Result<Option<Delivery>, DeliveryRepositoryError>;
}
