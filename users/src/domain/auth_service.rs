//! Credential checks and bearer token resolution.

use std::sync::Arc;

use async_trait::async_trait;
use service_core::Error;
use tracing::{debug, warn};

use crate::domain::ports::{
    Authenticator, IssuedToken, PasswordHasher, PasswordHasherError, TokenCodec, TokenError,
    UserRepository, UserRepositoryError,
};
use crate::domain::{AccountStatus, Credentials, User, map_repository_error};

/// Why authentication or authorisation was refused.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No account matches the email, or the token's subject no longer exists.
    #[error("user not found")]
    UserNotFound,
    /// The password does not match.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// The account exists but may not log in.
    #[error("access denied: account is {0}")]
    AccessDenied(AccountStatus),
    /// The token failed verification.
    #[error(transparent)]
    InvalidToken(TokenError),
    /// A token could not be issued.
    #[error(transparent)]
    Signing(TokenError),
    /// The user store failed.
    #[error(transparent)]
    Repository(#[from] UserRepositoryError),
    /// The hasher failed.
    #[error(transparent)]
    Hashing(#[from] PasswordHasherError),
}

/// Authentication service over a user store, a password hasher and a token
/// codec.
///
/// Authorisation deliberately skips the account status check: a token issued
/// while the account was active stays usable until it expires.
pub struct AuthService<R: ?Sized, H: ?Sized, T: ?Sized> {
    users: Arc<R>,
    hasher: Arc<H>,
    tokens: Arc<T>,
}

impl<R: ?Sized, H: ?Sized, T: ?Sized> Clone for AuthService<R, H, T> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            hasher: Arc::clone(&self.hasher),
            tokens: Arc::clone(&self.tokens),
        }
    }
}

impl<R, H, T> AuthService<R, H, T>
where
    R: UserRepository + ?Sized,
    H: PasswordHasher + ?Sized,
    T: TokenCodec + ?Sized,
{
    /// Create a new service from its collaborators.
    pub const fn new(users: Arc<R>, hasher: Arc<H>, tokens: Arc<T>) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    /// Verify credentials and issue a token for an active account.
    ///
    /// # Errors
    ///
    /// [`AuthError::UserNotFound`] for an unknown email,
    /// [`AuthError::InvalidCredentials`] for a wrong password,
    /// [`AuthError::AccessDenied`] for frozen or blocked accounts.
    pub async fn authenticate_credentials(
        &self,
        credentials: &Credentials,
    ) -> Result<IssuedToken, AuthError> {
        let user = self
            .users
            .find_by_email(credentials.email())
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let matches = self
            .hasher
            .verify(credentials.password(), user.password_hash())
            .await?;
        if !matches {
            return Err(AuthError::InvalidCredentials);
        }

        match user.status() {
            AccountStatus::Active => {}
            status @ (AccountStatus::Frozen | AccountStatus::Blocked) => {
                return Err(AuthError::AccessDenied(status));
            }
        }

        self.tokens.issue(&user).map_err(AuthError::Signing)
    }

    /// Verify a token and load the account it names.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidToken`] when verification fails and
    /// [`AuthError::UserNotFound`] when the account no longer exists.
    pub async fn authorize_token(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.tokens.verify(token).map_err(AuthError::InvalidToken)?;
        self.users
            .find_by_id(claims.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

fn map_login_error(error: AuthError) -> Error {
    match error {
        AuthError::UserNotFound | AuthError::InvalidCredentials => {
            warn!(reason = %error, "login rejected");
            Error::unauthorized("invalid email or password")
        }
        AuthError::AccessDenied(status) => {
            warn!(%status, "login refused for inactive account");
            Error::forbidden(format!("account is {status}"))
        }
        other => map_common_error(other, "login"),
    }
}

fn map_authorize_error(error: AuthError) -> Error {
    match error {
        AuthError::InvalidToken(reason) => {
            debug!(%reason, "bearer token rejected");
            Error::unauthorized("invalid token")
        }
        AuthError::UserNotFound => Error::unauthorized("account no longer exists"),
        other => map_common_error(other, "authorize"),
    }
}

fn map_common_error(error: AuthError, operation: &str) -> Error {
    match error {
        AuthError::Repository(err) => map_repository_error(err),
        AuthError::Hashing(err) => Error::internal(format!("{operation}: {err}")),
        AuthError::Signing(err) | AuthError::InvalidToken(err) => {
            Error::internal(format!("{operation}: {err}"))
        }
        AuthError::UserNotFound | AuthError::InvalidCredentials => {
            Error::unauthorized("invalid email or password")
        }
        AuthError::AccessDenied(status) => Error::forbidden(format!("account is {status}")),
    }
}

#[async_trait]
impl<R, H, T> Authenticator for AuthService<R, H, T>
where
    R: UserRepository + ?Sized,
    H: PasswordHasher + ?Sized,
    T: TokenCodec + ?Sized,
{
    async fn authenticate(&self, credentials: &Credentials) -> Result<IssuedToken, Error> {
        self.authenticate_credentials(credentials)
            .await
            .map_err(map_login_error)
    }

    async fn authorize(&self, token: &str) -> Result<User, Error> {
        self.authorize_token(token).await.map_err(map_authorize_error)
    }
}

#[cfg(test)]
#[path = "auth_service_tests.rs"]
mod tests;
