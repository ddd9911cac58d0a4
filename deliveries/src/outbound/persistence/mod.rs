//! PostgreSQL persistence for deliveries via Diesel.
//!
//! Row structs and the table definition stay private to this module; the
//! repository translates them into domain values.

mod diesel_delivery_repository;
mod models;
mod schema;

pub use diesel_delivery_repository::DieselDeliveryRepository;
