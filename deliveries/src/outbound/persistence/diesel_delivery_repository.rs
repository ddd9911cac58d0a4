//! PostgreSQL-backed `DeliveryRepository` implementation using Diesel ORM.
//!
//! Transitions are a single `UPDATE ... WHERE id = $1 AND version = $2`
//! that also bumps the version, so readers never see half a transition and
//! a stale writer changes nothing.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use service_core::persistence::{DbPool, PoolError, map_basic_diesel_error, map_basic_pool_error};
use tracing::{debug, warn};

use crate::domain::ports::{DeliveryRepository, DeliveryRepositoryError};
use crate::domain::{
    Delivery, DeliveryId, DeliveryParts, DeliveryStatus, Destination, NewDelivery, UserId,
    Version,
};

use super::models::{DeliveryRow, NewDeliveryRow, TransitionChangeset};
use super::schema::deliveries;

/// Diesel-backed implementation of the `DeliveryRepository` port.
#[derive(Clone)]
pub struct DieselDeliveryRepository {
    pool: DbPool,
}

impl DieselDeliveryRepository {
    /// Create a new repository with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> DeliveryRepositoryError {
    map_basic_pool_error(error, DeliveryRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> DeliveryRepositoryError {
    map_basic_diesel_error(
        error,
        DeliveryRepositoryError::query,
        DeliveryRepositoryError::connection,
    )
}

/// Convert a stored row, rejecting values the domain does not accept.
fn row_to_delivery(row: DeliveryRow) -> Result<Delivery, DeliveryRepositoryError> {
    let corrupt = |what: &str, detail: String| {
        warn!(delivery_id = row.id, what, %detail, "unreadable delivery row");
        DeliveryRepositoryError::query(format!("delivery {} has invalid {what}", row.id))
    };
    let status: DeliveryStatus = row
        .status
        .parse()
        .map_err(|err: crate::domain::StatusParseError| corrupt("status", err.to_string()))?;
    let destination = Destination::new(&row.destination)
        .map_err(|err| corrupt("destination", err.to_string()))?;

    Ok(Delivery::from(DeliveryParts {
        id: DeliveryId::new(row.id),
        status,
        destination,
        recipient_id: UserId::new(row.recipient_id),
        courier_id: row.courier_id.map(UserId::new),
        created_at: row.created_at,
        updated_at: row.updated_at,
        version: Version::new(row.version),
    }))
}

#[async_trait]
impl DeliveryRepository for DieselDeliveryRepository {
    async fn insert(&self, delivery: &NewDelivery) -> Result<Delivery, DeliveryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewDeliveryRow {
            status: DeliveryStatus::Created.as_str(),
            destination: delivery.destination.as_ref(),
            recipient_id: delivery.recipient_id.get(),
            created_at: delivery.created_at,
            updated_at: delivery.created_at,
        };

        let inserted: DeliveryRow = diesel::insert_into(deliveries::table)
            .values(&row)
            .returning(DeliveryRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_delivery(inserted)
    }

    async fn find_by_id(&self, id: DeliveryId) -> Result<Option<Delivery>, DeliveryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<DeliveryRow> = deliveries::table
            .filter(deliveries::id.eq(id.get()))
            .select(DeliveryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_delivery).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Delivery>, DeliveryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<DeliveryRow> = deliveries::table
            .order(deliveries::id.asc())
            .select(DeliveryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_delivery).collect()
    }

    async fn list_by_courier(
        &self,
        courier: UserId,
    ) -> Result<Vec<Delivery>, DeliveryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<DeliveryRow> = deliveries::table
            .filter(deliveries::courier_id.eq(courier.get()))
            .order(deliveries::id.asc())
            .select(DeliveryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_delivery).collect()
    }

    async fn update_if_version(
        &self,
        delivery: &Delivery,
    ) -> Result<Option<Delivery>, DeliveryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changes = TransitionChangeset {
            status: delivery.status().as_str(),
            courier_id: delivery.courier_id().map(UserId::get),
            updated_at: delivery.updated_at(),
        };

        let updated: Option<DeliveryRow> = diesel::update(
            deliveries::table
                .filter(deliveries::id.eq(delivery.id().get()))
                .filter(deliveries::version.eq(delivery.version().get())),
        )
        .set((&changes, deliveries::version.eq(deliveries::version + 1)))
        .returning(DeliveryRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        if updated.is_none() {
            debug!(
                delivery_id = %delivery.id(),
                expected_version = delivery.version().get(),
                "conditional update matched no row"
            );
        }
        updated.map(row_to_delivery).transpose()
    }
}
