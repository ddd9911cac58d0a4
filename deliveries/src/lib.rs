//! Deliveries service: delivery requests, courier assignment and
//! completion.
//!
//! Layout follows ports and adapters: [`domain`] holds the lifecycle and the
//! service, [`inbound`] the HTTP surface, [`outbound`] PostgreSQL storage and
//! the users service client. [`relay`] carries each request's credentials
//! onto the outbound calls made while serving it.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod relay;
pub mod server;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

use diesel_migrations::{EmbeddedMigrations, embed_migrations};

/// Schema migrations applied at startup.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");
