//! Domain ports.
//!
//! Driving ports (`DeliveriesCommand`, `DeliveriesQuery`) are what the HTTP
//! adapter calls; driven ports (`DeliveryRepository`, `CourierDirectory`,
//! `IdentityProvider`) are what the domain and the adapter call out to.

mod courier_directory;
mod deliveries;
mod delivery_repository;
mod identity_provider;

#[cfg(test)]
pub use courier_directory::MockCourierDirectory;
pub use courier_directory::{CourierDirectory, CourierDirectoryError};
#[cfg(test)]
pub use deliveries::{MockDeliveriesCommand, MockDeliveriesQuery};
pub use deliveries::{DeliveriesCommand, DeliveriesQuery};
#[cfg(test)]
pub use delivery_repository::MockDeliveryRepository;
pub use delivery_repository::{DeliveryRepository, DeliveryRepositoryError};
#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{IdentityError, IdentityProvider};
