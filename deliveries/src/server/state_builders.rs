//! Wiring of the delivery service into the HTTP state.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::DeliveryService;
use crate::domain::ports::{CourierDirectory, DeliveryRepository, IdentityProvider};
use crate::inbound::http::HttpState;

/// Build the HTTP state from driven adapters.
///
/// One [`DeliveryService`] backs both the command and query ports. In
/// deployment `couriers` and `identity` are the same users service client.
pub fn build_http_state(
    deliveries: Arc<dyn DeliveryRepository>,
    couriers: Arc<dyn CourierDirectory>,
    identity: Arc<dyn IdentityProvider>,
    clock: Arc<dyn Clock>,
) -> HttpState {
    let service = Arc::new(DeliveryService::new(deliveries, couriers, clock));
    HttpState::new(identity, service.clone(), service)
}
