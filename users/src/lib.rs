//! Users service: accounts, login and bearer token validation.
//!
//! Layout follows ports and adapters: [`domain`] holds the entities and
//! services, [`inbound`] the HTTP surface, [`outbound`] PostgreSQL storage
//! and credential cryptography.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod server;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

use diesel_migrations::{EmbeddedMigrations, embed_migrations};

/// Schema migrations applied at startup.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");
