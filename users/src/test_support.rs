//! Test utilities shared by unit and integration tests.
//!
//! Compiled for `cfg(test)` and behind the `test-support` feature so the
//! `tests/` suites can run live servers without PostgreSQL.

use std::sync::Mutex;

use async_trait::async_trait;
use service_core::Role;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{AccountStatus, Email, NewUser, User, UserId};

/// `UserRepository` held in memory, enforcing email uniqueness the way the
/// database index does.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<User>>, UserRepositoryError> {
        self.users
            .lock()
            .map_err(|_| UserRepositoryError::connection("in-memory store poisoned"))
    }

    /// Change the standing of a stored account; there is no HTTP route for
    /// this, so tests drive it directly.
    ///
    /// # Errors
    ///
    /// [`UserRepositoryError::Query`] when the id is unknown.
    pub fn set_status(&self, id: UserId, status: AccountStatus) -> Result<(), UserRepositoryError> {
        let mut users = self.lock()?;
        let slot = users
            .iter_mut()
            .find(|user| user.id() == id)
            .ok_or_else(|| UserRepositoryError::query(format!("user {id} not found")))?;
        *slot = User::new(
            slot.id(),
            slot.email().clone(),
            slot.role(),
            status,
            slot.password_hash().clone(),
        );
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &NewUser) -> Result<User, UserRepositoryError> {
        let mut users = self.lock()?;
        if users.iter().any(|existing| existing.email() == &user.email) {
            return Err(UserRepositoryError::duplicate_email(user.email.as_ref()));
        }
        let next_id = users.iter().map(|u| u.id().get()).max().unwrap_or(0) + 1;
        let stored = User::new(
            UserId::new(next_id),
            user.email.clone(),
            user.role,
            user.status,
            user.password_hash.clone(),
        );
        users.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.lock()?.iter().find(|user| user.id() == id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.lock()?.iter().find(|user| user.email() == email).cloned())
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, UserRepositoryError> {
        let mut matching: Vec<User> = self
            .lock()?
            .iter()
            .filter(|user| user.role() == role)
            .cloned()
            .collect();
        matching.sort_by_key(User::id);
        Ok(matching)
    }
}
