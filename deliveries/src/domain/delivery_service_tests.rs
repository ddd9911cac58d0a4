//! Tests for the delivery lifecycle orchestration.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockall::predicate::eq;
use rstest::{fixture, rstest};
use service_core::{ErrorCode, Role};
use tokio::sync::Barrier;

use super::*;
use crate::domain::ports::{MockCourierDirectory, MockDeliveryRepository};
use crate::domain::{DeliveryParts, DeliveryStatus, Version};
use crate::test_support::{InMemoryDeliveryRepository, StaticCourierDirectory};

const COURIER: i64 = 20;
const OTHER_COURIER: i64 = 21;

struct FixtureClock(DateTime<Utc>);

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock(now()))
}

fn stored(status: DeliveryStatus, courier: Option<i64>) -> Delivery {
    Delivery::from(DeliveryParts {
        id: DeliveryId::new(1),
        status,
        destination: Destination::new("Main St 1").expect("valid destination"),
        recipient_id: UserId::new(5),
        courier_id: courier.map(UserId::new),
        created_at: now() - chrono::TimeDelta::hours(1),
        updated_at: now() - chrono::TimeDelta::hours(1),
        version: Version::new(3),
    })
}

fn bumped(delivery: &Delivery) -> Delivery {
    let mut parts = delivery.clone().into_parts();
    parts.version = parts.version.next();
    Delivery::from(parts)
}

#[fixture]
fn courier() -> Caller {
    Caller::new(UserId::new(COURIER), "c@x.com", Role::Courier)
}

fn directory_with_courier() -> MockCourierDirectory {
    let mut couriers = MockCourierDirectory::new();
    couriers
        .expect_find_courier()
        .with(eq(UserId::new(COURIER)))
        .returning(|id| Ok(Some(Courier::new(id, "c@x.com"))));
    couriers
}

fn service(
    deliveries: MockDeliveryRepository,
    couriers: MockCourierDirectory,
) -> DeliveryService<MockDeliveryRepository, MockCourierDirectory> {
    DeliveryService::new(Arc::new(deliveries), Arc::new(couriers), clock())
}

#[rstest]
#[tokio::test]
async fn created_deliveries_read_back_unchanged() {
    let store = Arc::new(InMemoryDeliveryRepository::new());
    let deliveries = DeliveryService::new(
        store,
        Arc::new(StaticCourierDirectory::default()),
        clock(),
    );
    let recipient = Caller::new(UserId::new(5), "a@x.com", Role::User);

    let created = deliveries
        .create_delivery(&recipient, Destination::new(" Main St 1 ").expect("valid"))
        .await
        .expect("created");
    let loaded = deliveries.load(created.id()).await.expect("loaded");

    assert_eq!(loaded, created);
    assert_eq!(loaded.destination().as_ref(), "Main St 1");
    assert_eq!(loaded.recipient_id(), UserId::new(5));
    assert_eq!(loaded.status(), DeliveryStatus::Created);
    assert_eq!(loaded.courier_id(), None);
    assert_eq!(loaded.created_at(), now());
}

#[rstest]
#[case::created(DeliveryStatus::Created, None)]
#[case::reassignment(DeliveryStatus::Delivers, Some(OTHER_COURIER))]
#[tokio::test]
async fn assignable_deliveries_take_the_courier(
    #[case] status: DeliveryStatus,
    #[case] previous: Option<i64>,
) {
    let mut deliveries = MockDeliveryRepository::new();
    deliveries
        .expect_find_by_id()
        .returning(move |_| Ok(Some(stored(status, previous))));
    deliveries
        .expect_update_if_version()
        .withf(|next| {
            next.status() == DeliveryStatus::Delivers
                && next.courier_id() == Some(UserId::new(COURIER))
                && next.updated_at() == now()
                && next.version() == Version::new(3)
        })
        .times(1)
        .returning(|next| Ok(Some(bumped(next))));
    let service = service(deliveries, directory_with_courier());

    let assigned = service
        .assign(DeliveryId::new(1), UserId::new(COURIER))
        .await
        .expect("assigned");

    assert_eq!(assigned.status(), DeliveryStatus::Delivers);
    assert_eq!(assigned.courier_id(), Some(UserId::new(COURIER)));
    assert_eq!(assigned.version(), Version::new(4));
}

#[rstest]
#[case::completed(DeliveryStatus::Completed)]
#[case::canceled(DeliveryStatus::Canceled)]
#[tokio::test]
async fn terminal_deliveries_are_not_reassigned(#[case] status: DeliveryStatus) {
    let mut deliveries = MockDeliveryRepository::new();
    deliveries
        .expect_find_by_id()
        .returning(move |_| Ok(Some(stored(status, Some(OTHER_COURIER)))));
    deliveries.expect_update_if_version().never();
    let service = service(deliveries, directory_with_courier());

    let err = service
        .assign(DeliveryId::new(1), UserId::new(COURIER))
        .await
        .expect_err("not assignable");

    assert!(matches!(err, DeliveryError::NotAssignable(_)));
    let api: Error = err.into();
    assert_eq!(api.code(), ErrorCode::Conflict);
    assert_eq!(
        api.details().and_then(|d| d.get("status")).and_then(|s| s.as_str()),
        Some(status.as_str())
    );
}

#[rstest]
#[tokio::test]
async fn unknown_couriers_are_rejected_before_loading() {
    let mut couriers = MockCourierDirectory::new();
    couriers.expect_find_courier().returning(|_| Ok(None));
    let mut deliveries = MockDeliveryRepository::new();
    deliveries.expect_find_by_id().never();
    let service = service(deliveries, couriers);

    let err = service
        .assign(DeliveryId::new(1), UserId::new(99))
        .await
        .expect_err("unknown courier");

    assert!(matches!(err, DeliveryError::CourierNotFound(id) if id == UserId::new(99)));
    let api: Error = err.into();
    assert_eq!(api.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        api.details().and_then(|d| d.get("code")).and_then(|c| c.as_str()),
        Some("courier_not_found")
    );
}

#[rstest]
#[case::rejected(CourierDirectoryError::rejected("status 403"), ErrorCode::InvalidRequest)]
#[case::transport(CourierDirectoryError::transport("connection refused"), ErrorCode::InternalError)]
#[case::decode(CourierDirectoryError::decode("expected value"), ErrorCode::InternalError)]
#[tokio::test]
async fn courier_lookup_failures_are_upstream_errors(
    #[case] failure: CourierDirectoryError,
    #[case] expected: ErrorCode,
) {
    let mut couriers = MockCourierDirectory::new();
    couriers
        .expect_find_courier()
        .returning(move |_| Err(failure.clone()));
    let service = service(MockDeliveryRepository::new(), couriers);

    let err = service
        .assign(DeliveryId::new(1), UserId::new(COURIER))
        .await
        .expect_err("upstream failure");

    assert!(matches!(err, DeliveryError::Upstream(_)));
    assert_eq!(Error::from(err).code(), expected);
}

#[rstest]
#[tokio::test]
async fn missing_deliveries_are_invalid_requests() {
    let mut deliveries = MockDeliveryRepository::new();
    deliveries.expect_find_by_id().returning(|_| Ok(None));
    let service = service(deliveries, directory_with_courier());

    let err = service
        .assign(DeliveryId::new(404), UserId::new(COURIER))
        .await
        .expect_err("missing delivery");

    let api: Error = err.into();
    assert_eq!(api.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        api.details().and_then(|d| d.get("code")).and_then(|c| c.as_str()),
        Some("delivery_not_found")
    );
}

#[rstest]
#[tokio::test]
async fn assigned_courier_completes(courier: Caller) {
    let mut deliveries = MockDeliveryRepository::new();
    deliveries
        .expect_find_by_id()
        .returning(|_| Ok(Some(stored(DeliveryStatus::Delivers, Some(COURIER)))));
    deliveries
        .expect_update_if_version()
        .withf(|next| {
            next.status() == DeliveryStatus::Completed
                && next.courier_id() == Some(UserId::new(COURIER))
        })
        .times(1)
        .returning(|next| Ok(Some(bumped(next))));
    let service = service(deliveries, MockCourierDirectory::new());

    let completed = service
        .complete_delivery(DeliveryId::new(1), &courier)
        .await
        .expect("completed");

    assert_eq!(completed.status(), DeliveryStatus::Completed);
    assert_eq!(completed.updated_at(), now());
}

#[rstest]
#[case::delivering(DeliveryStatus::Delivers)]
#[case::completed(DeliveryStatus::Completed)]
#[case::canceled(DeliveryStatus::Canceled)]
#[tokio::test]
async fn other_couriers_are_forbidden_whatever_the_status(
    courier: Caller,
    #[case] status: DeliveryStatus,
) {
    let mut deliveries = MockDeliveryRepository::new();
    deliveries
        .expect_find_by_id()
        .returning(move |_| Ok(Some(stored(status, Some(OTHER_COURIER)))));
    deliveries.expect_update_if_version().never();
    let service = service(deliveries, MockCourierDirectory::new());

    let err = service
        .complete_delivery(DeliveryId::new(1), &courier)
        .await
        .expect_err("forbidden");

    assert!(matches!(err, DeliveryError::Forbidden { .. }));
    assert_eq!(Error::from(err).code(), ErrorCode::Forbidden);
}

#[rstest]
#[case::created(DeliveryStatus::Created, None)]
#[case::completed(DeliveryStatus::Completed, Some(COURIER))]
#[case::canceled(DeliveryStatus::Canceled, Some(COURIER))]
#[tokio::test]
async fn only_delivering_deliveries_complete(
    courier: Caller,
    #[case] status: DeliveryStatus,
    #[case] assigned: Option<i64>,
) {
    let mut deliveries = MockDeliveryRepository::new();
    deliveries
        .expect_find_by_id()
        .returning(move |_| Ok(Some(stored(status, assigned))));
    deliveries.expect_update_if_version().never();
    let service = service(deliveries, MockCourierDirectory::new());

    let err = service
        .complete_delivery(DeliveryId::new(1), &courier)
        .await
        .expect_err("not completable");

    assert!(matches!(err, DeliveryError::NotCompletable(_)));
    assert_eq!(Error::from(err).code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn a_lost_version_check_is_a_conflict(courier: Caller) {
    let mut deliveries = MockDeliveryRepository::new();
    deliveries
        .expect_find_by_id()
        .returning(|_| Ok(Some(stored(DeliveryStatus::Delivers, Some(COURIER)))));
    deliveries
        .expect_update_if_version()
        .returning(|_| Ok(None));
    let service = service(deliveries, MockCourierDirectory::new());

    let err = service
        .complete_delivery(DeliveryId::new(1), &courier)
        .await
        .expect_err("lost race");

    assert!(matches!(err, DeliveryError::ConcurrentModification(_)));
    let api: Error = err.into();
    assert_eq!(api.code(), ErrorCode::Conflict);
    assert_eq!(
        api.details().and_then(|d| d.get("code")).and_then(|c| c.as_str()),
        Some("concurrent_modification")
    );
}

#[rstest]
#[case::connection(DeliveryRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case::query(DeliveryRepositoryError::query("syntax"), ErrorCode::InternalError)]
#[tokio::test]
async fn store_failures_keep_their_kind(
    #[case] failure: DeliveryRepositoryError,
    #[case] expected: ErrorCode,
) {
    let mut deliveries = MockDeliveryRepository::new();
    deliveries
        .expect_list_all()
        .returning(move || Err(failure.clone()));
    let service = service(deliveries, MockCourierDirectory::new());

    let err = DeliveriesQuery::list_all(&service)
        .await
        .expect_err("store failure");

    assert_eq!(err.code(), expected);
}

/// Store wrapper that holds every reader until `parties` reads are in
/// flight, so concurrent transitions all see the same version.
struct RacingRepository {
    inner: InMemoryDeliveryRepository,
    barrier: Barrier,
}

#[async_trait]
impl DeliveryRepository for RacingRepository {
    async fn insert(&self, delivery: &NewDelivery) -> Result<Delivery, DeliveryRepositoryError> {
        self.inner.insert(delivery).await
    }

    async fn find_by_id(&self, id: DeliveryId) -> Result<Option<Delivery>, DeliveryRepositoryError> {
        let found = self.inner.find_by_id(id).await?;
        self.barrier.wait().await;
        Ok(found)
    }

    async fn list_all(&self) -> Result<Vec<Delivery>, DeliveryRepositoryError> {
        self.inner.list_all().await
    }

    async fn list_by_courier(
        &self,
        courier: UserId,
    ) -> Result<Vec<Delivery>, DeliveryRepositoryError> {
        self.inner.list_by_courier(courier).await
    }

    async fn update_if_version(
        &self,
        delivery: &Delivery,
    ) -> Result<Option<Delivery>, DeliveryRepositoryError> {
        self.inner.update_if_version(delivery).await
    }
}

#[rstest]
#[tokio::test]
async fn concurrent_transitions_on_one_version_persist_once() {
    let inner = InMemoryDeliveryRepository::new();
    inner
        .seed(stored(DeliveryStatus::Created, None))
        .expect("seeded");
    let store = Arc::new(RacingRepository {
        inner,
        barrier: Barrier::new(2),
    });
    let directory = Arc::new(StaticCourierDirectory::new([
        Courier::new(UserId::new(COURIER), "c@x.com"),
        Courier::new(UserId::new(OTHER_COURIER), "d@x.com"),
    ]));
    let service = DeliveryService::new(Arc::clone(&store), directory, clock());

    let (first, second) = tokio::join!(
        service.assign(DeliveryId::new(1), UserId::new(COURIER)),
        service.assign(DeliveryId::new(1), UserId::new(OTHER_COURIER)),
    );

    let outcomes = [first, second];
    let winners: Vec<&Delivery> = outcomes.iter().filter_map(|r| r.as_ref().ok()).collect();
    let losers = outcomes
        .iter()
        .filter(|r| matches!(r, Err(DeliveryError::ConcurrentModification(_))))
        .count();
    assert_eq!(winners.len(), 1);
    assert_eq!(losers, 1);

    let persisted = store
        .inner
        .find_by_id(DeliveryId::new(1))
        .await
        .expect("find")
        .expect("present");
    assert_eq!(persisted.version(), Version::new(4));
    assert_eq!(persisted.courier_id(), winners.first().and_then(|d| d.courier_id()));
}
