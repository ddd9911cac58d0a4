//! Test utilities shared by unit and integration tests.
//!
//! Compiled for `cfg(test)` and behind the `test-support` feature so the
//! `tests/` suites can run live servers without PostgreSQL.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    CourierDirectory, CourierDirectoryError, DeliveryRepository, DeliveryRepositoryError,
};
use crate::domain::{
    Courier, Delivery, DeliveryId, DeliveryParts, DeliveryStatus, NewDelivery, UserId, Version,
};

/// `DeliveryRepository` held in memory, applying the same version check as
/// the conditional `UPDATE`.
#[derive(Default)]
pub struct InMemoryDeliveryRepository {
    deliveries: Mutex<Vec<Delivery>>,
}

impl InMemoryDeliveryRepository {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Delivery>>, DeliveryRepositoryError> {
        self.deliveries
            .lock()
            .map_err(|_| DeliveryRepositoryError::connection("in-memory store poisoned"))
    }

    /// Store a delivery as-is, replacing any with the same id. Lets tests
    /// seed statuses no operation produces, such as `canceled`.
    ///
    /// # Errors
    ///
    /// [`DeliveryRepositoryError::Connection`] when the store is poisoned.
    pub fn seed(&self, delivery: Delivery) -> Result<(), DeliveryRepositoryError> {
        let mut deliveries = self.lock()?;
        deliveries.retain(|existing| existing.id() != delivery.id());
        deliveries.push(delivery);
        deliveries.sort_by_key(Delivery::id);
        Ok(())
    }
}

#[async_trait]
impl DeliveryRepository for InMemoryDeliveryRepository {
    async fn insert(&self, delivery: &NewDelivery) -> Result<Delivery, DeliveryRepositoryError> {
        let mut deliveries = self.lock()?;
        let next_id = deliveries.iter().map(|d| d.id().get()).max().unwrap_or(0) + 1;
        let stored = Delivery::from(DeliveryParts {
            id: DeliveryId::new(next_id),
            status: DeliveryStatus::Created,
            destination: delivery.destination.clone(),
            recipient_id: delivery.recipient_id,
            courier_id: None,
            created_at: delivery.created_at,
            updated_at: delivery.created_at,
            version: Version::INITIAL,
        });
        deliveries.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: DeliveryId) -> Result<Option<Delivery>, DeliveryRepositoryError> {
        Ok(self.lock()?.iter().find(|d| d.id() == id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Delivery>, DeliveryRepositoryError> {
        Ok(self.lock()?.clone())
    }

    async fn list_by_courier(
        &self,
        courier: UserId,
    ) -> Result<Vec<Delivery>, DeliveryRepositoryError> {
        Ok(self
            .lock()?
            .iter()
            .filter(|d| d.is_assigned_to(courier))
            .cloned()
            .collect())
    }

    async fn update_if_version(
        &self,
        delivery: &Delivery,
    ) -> Result<Option<Delivery>, DeliveryRepositoryError> {
        let mut deliveries = self.lock()?;
        let Some(slot) = deliveries.iter_mut().find(|d| d.id() == delivery.id()) else {
            return Ok(None);
        };
        if slot.version() != delivery.version() {
            return Ok(None);
        }
        let mut parts = delivery.clone().into_parts();
        parts.created_at = slot.created_at();
        parts.recipient_id = slot.recipient_id();
        parts.destination = slot.destination().clone();
        parts.version = slot.version().next();
        *slot = Delivery::from(parts);
        Ok(Some(slot.clone()))
    }
}

/// `CourierDirectory` answering from a fixed table.
#[derive(Default)]
pub struct StaticCourierDirectory {
    couriers: HashMap<UserId, Courier>,
}

impl StaticCourierDirectory {
    /// Directory knowing exactly `couriers`.
    #[must_use]
    pub fn new(couriers: impl IntoIterator<Item = Courier>) -> Self {
        Self {
            couriers: couriers
                .into_iter()
                .map(|courier| (courier.id(), courier))
                .collect(),
        }
    }
}

#[async_trait]
impl CourierDirectory for StaticCourierDirectory {
    async fn find_courier(&self, id: UserId) -> Result<Option<Courier>, CourierDirectoryError> {
        Ok(self.couriers.get(&id).cloned())
    }
}
