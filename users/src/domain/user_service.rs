//! Account creation and courier lookups.

use std::sync::Arc;

use async_trait::async_trait;
use service_core::{Error, Role};
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    AccountsCommand, CouriersQuery, PasswordHasher, PasswordHasherError, UserRepository,
    UserRepositoryError,
};
use crate::domain::{AccountStatus, Credentials, NewUser, User, UserId, map_repository_error};

/// Why an account operation failed.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// The email is already registered.
    #[error("an account with email {0} already exists")]
    DuplicateEmail(String),
    /// No courier has this id.
    #[error("courier {0} not found")]
    CourierNotFound(UserId),
    /// The bootstrap email belongs to an account that is not an active admin.
    #[error("bootstrap email {email} belongs to a {status} {role} account")]
    BootstrapConflict {
        /// The configured email.
        email: String,
        /// Role of the existing account.
        role: Role,
        /// Status of the existing account.
        status: AccountStatus,
    },
    /// The user store failed.
    #[error(transparent)]
    Repository(UserRepositoryError),
    /// The hasher failed.
    #[error(transparent)]
    Hashing(#[from] PasswordHasherError),
}

impl From<UserRepositoryError> for AccountError {
    fn from(value: UserRepositoryError) -> Self {
        match value {
            UserRepositoryError::DuplicateEmail { email } => Self::DuplicateEmail(email),
            other => Self::Repository(other),
        }
    }
}

impl From<AccountError> for Error {
    fn from(value: AccountError) -> Self {
        match value {
            AccountError::DuplicateEmail(email) => {
                Self::conflict(format!("an account with email {email} already exists"))
                    .with_details(json!({ "field": "email", "code": "duplicate_email" }))
            }
            AccountError::CourierNotFound(id) => Self::not_found(format!("courier {id} not found")),
            err @ AccountError::BootstrapConflict { .. } => Self::conflict(err.to_string()),
            AccountError::Repository(err) => map_repository_error(err),
            AccountError::Hashing(err) => Self::internal(err.to_string()),
        }
    }
}

/// Account service over a user store and a password hasher.
pub struct UserService<R: ?Sized, H: ?Sized> {
    users: Arc<R>,
    hasher: Arc<H>,
}

impl<R: ?Sized, H: ?Sized> Clone for UserService<R, H> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            hasher: Arc::clone(&self.hasher),
        }
    }
}

impl<R, H> UserService<R, H>
where
    R: UserRepository + ?Sized,
    H: PasswordHasher + ?Sized,
{
    /// Create a new service from its collaborators.
    pub const fn new(users: Arc<R>, hasher: Arc<H>) -> Self {
        Self { users, hasher }
    }

    /// Create an active account with `role`.
    ///
    /// # Errors
    ///
    /// [`AccountError::DuplicateEmail`] when the email is taken, including
    /// when a concurrent signup wins the race at the unique index.
    pub async fn create_account(
        &self,
        credentials: &Credentials,
        role: Role,
    ) -> Result<User, AccountError> {
        if self.users.find_by_email(credentials.email()).await?.is_some() {
            return Err(AccountError::DuplicateEmail(credentials.email().to_string()));
        }

        let password_hash = self.hasher.hash(credentials.password()).await?;
        let user = self
            .users
            .insert(&NewUser {
                email: credentials.email().clone(),
                password_hash,
                role,
                status: AccountStatus::Active,
            })
            .await?;
        info!(user_id = %user.id(), %role, "account created");
        Ok(user)
    }

    /// Look up a courier by id.
    ///
    /// # Errors
    ///
    /// [`AccountError::CourierNotFound`] when the id is unknown or belongs to
    /// another role.
    pub async fn courier(&self, id: UserId) -> Result<User, AccountError> {
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or(AccountError::CourierNotFound(id))?;
        match user.role() {
            Role::Courier => Ok(user),
            Role::User | Role::Admin => Err(AccountError::CourierNotFound(id)),
        }
    }

    /// Make sure the configured administrator exists and is active.
    ///
    /// An existing account with the email is accepted only when it is an
    /// active admin.
    ///
    /// # Errors
    ///
    /// [`AccountError::BootstrapConflict`] when the email belongs to any
    /// other account. Propagates store and hasher failures.
    pub async fn ensure_admin(&self, credentials: &Credentials) -> Result<User, AccountError> {
        if let Some(existing) = self.users.find_by_email(credentials.email()).await? {
            return match (existing.role(), existing.status()) {
                (Role::Admin, AccountStatus::Active) => Ok(existing),
                (role, status) => {
                    warn!(
                        user_id = %existing.id(),
                        %role,
                        %status,
                        "bootstrap admin email belongs to another account"
                    );
                    Err(AccountError::BootstrapConflict {
                        email: existing.email().to_string(),
                        role,
                        status,
                    })
                }
            };
        }
        self.create_account(credentials, Role::Admin).await
    }
}

#[async_trait]
impl<R, H> AccountsCommand for UserService<R, H>
where
    R: UserRepository + ?Sized,
    H: PasswordHasher + ?Sized,
{
    async fn sign_up(&self, credentials: &Credentials) -> Result<User, Error> {
        Ok(self.create_account(credentials, Role::User).await?)
    }

    async fn create_courier(&self, credentials: &Credentials) -> Result<User, Error> {
        Ok(self.create_account(credentials, Role::Courier).await?)
    }
}

#[async_trait]
impl<R, H> CouriersQuery for UserService<R, H>
where
    R: UserRepository + ?Sized,
    H: PasswordHasher + ?Sized,
{
    async fn list_couriers(&self) -> Result<Vec<User>, Error> {
        self.users
            .list_by_role(Role::Courier)
            .await
            .map_err(map_repository_error)
    }

    async fn find_courier(&self, id: UserId) -> Result<User, Error> {
        Ok(self.courier(id).await?)
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
