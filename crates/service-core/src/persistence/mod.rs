//! Diesel plumbing shared by the service persistence adapters.

mod error_mapping;
mod migrations;
mod pool;

pub use error_mapping::{is_unique_violation, map_basic_diesel_error, map_basic_pool_error};
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolError};
