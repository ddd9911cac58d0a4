//! PostgreSQL persistence for user accounts via Diesel.
//!
//! Row structs and the table definition stay private to this module; the
//! repository translates them into domain values.

mod diesel_user_repository;
mod models;
mod schema;

pub use diesel_user_repository::DieselUserRepository;
