//! Delivery lifecycle orchestration.
//!
//! Every transition is read, checked against the lifecycle rules, then
//! written back conditionally on the version that was read. A writer that
//! loses the race gets [`DeliveryError::ConcurrentModification`] and leaves
//! the row as the winner wrote it.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use service_core::Error;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    CourierDirectory, CourierDirectoryError, DeliveriesCommand, DeliveriesQuery,
    DeliveryRepository, DeliveryRepositoryError,
};
use crate::domain::{
    Caller, Courier, Delivery, DeliveryId, Destination, NewDelivery,
    TransitionRejected, UserId, map_repository_error,
};

/// Why a delivery operation failed.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// No courier has this id.
    #[error("courier {0} not found")]
    CourierNotFound(UserId),
    /// No delivery has this id.
    #[error("delivery {0} not found")]
    DeliveryNotFound(DeliveryId),
    /// The delivery cannot take a courier in its current status.
    #[error(transparent)]
    NotAssignable(TransitionRejected),
    /// The delivery cannot be completed in its current status.
    #[error(transparent)]
    NotCompletable(TransitionRejected),
    /// Another courier is assigned.
    #[error("delivery {delivery} is assigned to another courier")]
    Forbidden {
        /// The delivery.
        delivery: DeliveryId,
        /// The courier who tried to act on it.
        courier: UserId,
    },
    /// Another transition was persisted between read and write.
    #[error("delivery {0} was modified concurrently")]
    ConcurrentModification(DeliveryId),
    /// The delivery store failed.
    #[error(transparent)]
    Repository(#[from] DeliveryRepositoryError),
    /// The users service failed or refused the lookup.
    #[error(transparent)]
    Upstream(#[from] CourierDirectoryError),
}

fn rejection(err: &TransitionRejected, code: &str) -> Error {
    Error::conflict(err.to_string()).with_details(json!({
        "code": code,
        "operation": err.operation.to_string(),
        "status": err.status.as_str(),
    }))
}

impl From<DeliveryError> for Error {
    fn from(value: DeliveryError) -> Self {
        match value {
            DeliveryError::CourierNotFound(id) => {
                Self::invalid_request(format!("courier {id} not found"))
                    .with_details(json!({ "code": "courier_not_found", "courierId": id }))
            }
            DeliveryError::DeliveryNotFound(id) => {
                Self::invalid_request(format!("delivery {id} not found"))
                    .with_details(json!({ "code": "delivery_not_found", "deliveryId": id }))
            }
            DeliveryError::NotAssignable(err) => rejection(&err, "not_assignable"),
            DeliveryError::NotCompletable(err) => rejection(&err, "not_completable"),
            DeliveryError::Forbidden { delivery, .. } => {
                Self::forbidden(format!("delivery {delivery} is assigned to another courier"))
            }
            DeliveryError::ConcurrentModification(id) => {
                Self::conflict(format!("delivery {id} was modified concurrently; retry"))
                    .with_details(json!({ "code": "concurrent_modification" }))
            }
            DeliveryError::Repository(err) => map_repository_error(err),
            DeliveryError::Upstream(CourierDirectoryError::Rejected { message }) => {
                Self::invalid_request(format!("users service refused the courier lookup: {message}"))
                    .with_details(json!({ "code": "upstream_rejected" }))
            }
            DeliveryError::Upstream(err) => Self::internal(err.to_string()),
        }
    }
}

/// Delivery service over a delivery store and the courier directory.
pub struct DeliveryService<R: ?Sized, C: ?Sized> {
    deliveries: Arc<R>,
    couriers: Arc<C>,
    clock: Arc<dyn Clock>,
}

impl<R: ?Sized, C: ?Sized> Clone for DeliveryService<R, C> {
    fn clone(&self) -> Self {
        Self {
            deliveries: Arc::clone(&self.deliveries),
            couriers: Arc::clone(&self.couriers),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, C> DeliveryService<R, C>
where
    R: DeliveryRepository + ?Sized,
    C: CourierDirectory + ?Sized,
{
    /// Create a new service from its collaborators.
    pub fn new(deliveries: Arc<R>, couriers: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self {
            deliveries,
            couriers,
            clock,
        }
    }

    /// Record a new delivery requested by `recipient`.
    ///
    /// # Errors
    ///
    /// [`DeliveryError::Repository`] when the store rejects the write.
    pub async fn create_delivery(
        &self,
        recipient: &Caller,
        destination: Destination,
    ) -> Result<Delivery, DeliveryError> {
        let delivery = self
            .deliveries
            .insert(&NewDelivery {
                destination,
                recipient_id: recipient.id(),
                created_at: self.clock.utc(),
            })
            .await?;
        info!(delivery_id = %delivery.id(), recipient_id = %recipient.id(), "delivery created");
        Ok(delivery)
    }

    /// Hand a delivery to a courier, replacing any previous assignment.
    ///
    /// The courier is resolved first so an unknown courier is reported even
    /// when the delivery is also missing.
    ///
    /// # Errors
    ///
    /// [`DeliveryError::CourierNotFound`], [`DeliveryError::DeliveryNotFound`],
    /// [`DeliveryError::NotAssignable`] or
    /// [`DeliveryError::ConcurrentModification`].
    pub async fn assign(
        &self,
        id: DeliveryId,
        courier_id: UserId,
    ) -> Result<Delivery, DeliveryError> {
        let courier = self.resolve_courier(courier_id).await?;
        let current = self.load(id).await?;
        let next = current
            .assigned_to(courier.id(), self.clock.utc())
            .map_err(DeliveryError::NotAssignable)?;
        let stored = self.persist(&next).await?;
        info!(delivery_id = %id, courier_id = %courier.id(), "courier assigned");
        Ok(stored)
    }

    /// Mark a delivery handed over by `courier`.
    ///
    /// # Errors
    ///
    /// [`DeliveryError::DeliveryNotFound`], [`DeliveryError::Forbidden`] when
    /// another courier is assigned, [`DeliveryError::NotCompletable`] or
    /// [`DeliveryError::ConcurrentModification`].
    pub async fn complete_delivery(
        &self,
        id: DeliveryId,
        courier: &Caller,
    ) -> Result<Delivery, DeliveryError> {
        let current = self.load(id).await?;
        if current
            .courier_id()
            .is_some_and(|assigned| assigned != courier.id())
        {
            warn!(delivery_id = %id, caller_id = %courier.id(), "completion by unassigned courier");
            return Err(DeliveryError::Forbidden {
                delivery: id,
                courier: courier.id(),
            });
        }
        let next = current
            .completed(self.clock.utc())
            .map_err(DeliveryError::NotCompletable)?;
        let stored = self.persist(&next).await?;
        info!(delivery_id = %id, courier_id = %courier.id(), "delivery completed");
        Ok(stored)
    }

    /// Load one delivery.
    ///
    /// # Errors
    ///
    /// [`DeliveryError::DeliveryNotFound`] when the id is unknown.
    pub async fn load(&self, id: DeliveryId) -> Result<Delivery, DeliveryError> {
        self.deliveries
            .find_by_id(id)
            .await?
            .ok_or(DeliveryError::DeliveryNotFound(id))
    }

    async fn resolve_courier(&self, id: UserId) -> Result<Courier, DeliveryError> {
        let courier = self.couriers.find_courier(id).await.map_err(|err| {
            debug!(courier_id = %id, error = %err, "courier lookup failed");
            DeliveryError::Upstream(err)
        })?;
        courier.ok_or(DeliveryError::CourierNotFound(id))
    }

    async fn persist(&self, next: &Delivery) -> Result<Delivery, DeliveryError> {
        match self.deliveries.update_if_version(next).await? {
            Some(stored) => Ok(stored),
            None => {
                warn!(
                    delivery_id = %next.id(),
                    version = next.version().get(),
                    "lost optimistic update"
                );
                Err(DeliveryError::ConcurrentModification(next.id()))
            }
        }
    }
}

#[async_trait]
impl<R, C> DeliveriesCommand for DeliveryService<R, C>
where
    R: DeliveryRepository + ?Sized,
    C: CourierDirectory + ?Sized,
{
    async fn create(&self, recipient: &Caller, destination: Destination) -> Result<Delivery, Error> {
        Ok(self.create_delivery(recipient, destination).await?)
    }

    async fn assign_courier(&self, id: DeliveryId, courier: UserId) -> Result<Delivery, Error> {
        Ok(self.assign(id, courier).await?)
    }

    async fn complete(&self, id: DeliveryId, courier: &Caller) -> Result<Delivery, Error> {
        Ok(self.complete_delivery(id, courier).await?)
    }
}

#[async_trait]
impl<R, C> DeliveriesQuery for DeliveryService<R, C>
where
    R: DeliveryRepository + ?Sized,
    C: CourierDirectory + ?Sized,
{
    async fn list_all(&self) -> Result<Vec<Delivery>, Error> {
        self.deliveries
            .list_all()
            .await
            .map_err(map_repository_error)
    }

    async fn list_for_courier(&self, courier: UserId) -> Result<Vec<Delivery>, Error> {
        self.deliveries
            .list_by_courier(courier)
            .await
            .map_err(map_repository_error)
    }

    async fn find(&self, id: DeliveryId) -> Result<Delivery, Error> {
        Ok(self.load(id).await?)
    }
}

#[cfg(test)]
#[path = "delivery_service_tests.rs"]
mod tests;
