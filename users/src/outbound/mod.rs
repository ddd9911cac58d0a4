//! Driven adapters: PostgreSQL storage and credential cryptography.

pub mod crypto;
pub mod persistence;
