//! Deliveries domain: the delivery lifecycle and the service orchestrating
//! it against storage and the users service.
//!
//! Services depend only on the traits in [`ports`]; adapters in
//! `crate::outbound` and `crate::inbound` plug into them.

pub mod delivery;
pub mod delivery_service;
pub mod identity;
pub mod ports;

pub use self::delivery::{
    Delivery, DeliveryId, DeliveryParts, DeliveryStatus, Destination, DestinationError,
    NewDelivery, StatusParseError, Transition, TransitionRejected, Version,
};
pub use self::delivery_service::{DeliveryError, DeliveryService};
pub use self::identity::{Caller, Courier, UserId};

use service_core::Error;
use tracing::error;

use self::ports::DeliveryRepositoryError;

/// Translate a store failure into the API error taxonomy.
pub(crate) fn map_repository_error(error: DeliveryRepositoryError) -> Error {
    match error {
        DeliveryRepositoryError::Connection { message } => {
            error!(%message, "delivery store unavailable");
            Error::service_unavailable("delivery store unavailable")
        }
        DeliveryRepositoryError::Query { message } => {
            error!(%message, "delivery store query failed");
            Error::internal(message)
        }
    }
}
