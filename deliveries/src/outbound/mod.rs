//! Driven adapters: PostgreSQL storage and the users service client.

pub mod persistence;
pub mod users_api;
