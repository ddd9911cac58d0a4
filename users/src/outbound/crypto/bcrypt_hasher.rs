//! bcrypt-backed `PasswordHasher`.
//!
//! Hashing is CPU-bound, so both operations run on the blocking pool.

use async_trait::async_trait;
use tokio::task;

use crate::domain::ports::{PasswordHasher, PasswordHasherError};
use crate::domain::{Password, PasswordHash};

/// Salted bcrypt with a configurable work factor.
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    /// Create a hasher using `cost` rounds (4..=31).
    ///
    /// # Errors
    ///
    /// [`PasswordHasherError::Hashing`] when `cost` is outside bcrypt's range.
    pub fn new(cost: u32) -> Result<Self, PasswordHasherError> {
        if !(4..=31).contains(&cost) {
            return Err(PasswordHasherError::hashing(format!(
                "bcrypt cost {cost} is outside 4..=31"
            )));
        }
        Ok(Self { cost })
    }
}

fn map_join_error(error: task::JoinError) -> PasswordHasherError {
    PasswordHasherError::hashing(format!("hashing task failed: {error}"))
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHasherError> {
        let secret = password.clone();
        let cost = self.cost;
        let encoded = task::spawn_blocking(move || bcrypt::hash(secret.expose(), cost))
            .await
            .map_err(map_join_error)?
            .map_err(|err| PasswordHasherError::hashing(err.to_string()))?;
        Ok(PasswordHash::new(encoded))
    }

    async fn verify(
        &self,
        password: &Password,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHasherError> {
        let secret = password.clone();
        let encoded = hash.as_str().to_owned();
        task::spawn_blocking(move || bcrypt::verify(secret.expose(), &encoded))
            .await
            .map_err(map_join_error)?
            .map_err(|err| PasswordHasherError::hashing(err.to_string()))
    }
}
