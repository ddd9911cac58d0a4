//! Port for one-way password hashing.

use async_trait::async_trait;
use service_core::define_port_error;

use crate::domain::{Password, PasswordHash};

define_port_error! {
    /// Failures raised by hashing adapters.
    pub enum PasswordHasherError {
        /// The hash could not be produced or parsed.
        Hashing { message: String } => "password hashing failed: {message}",
    }
}

/// Hash and verify passwords.
///
/// Implementations must compare in constant time.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Produce a salted hash of `password`.
    async fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHasherError>;

    /// Whether `password` matches `hash`.
    async fn verify(
        &self,
        password: &Password,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHasherError>;
}
