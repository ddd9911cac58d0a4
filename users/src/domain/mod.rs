//! Users domain: accounts, credentials, and the services over them.
//!
//! Services depend only on the traits in [`ports`]; adapters in
//! `crate::outbound` and `crate::inbound` plug into them.

pub mod auth_service;
pub mod ports;
pub mod user;
pub mod user_service;

pub use self::auth_service::{AuthError, AuthService};
pub use self::user::{
    AccountStatus, Credentials, Email, NewUser, Password, PasswordHash, User, UserId,
    UserValidationError,
};
pub use self::user_service::{AccountError, UserService};

use service_core::Error;
use tracing::error;

use self::ports::UserRepositoryError;

/// Translate a store failure into the API error taxonomy.
pub(crate) fn map_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            error!(%message, "user store unavailable");
            Error::service_unavailable("user store unavailable")
        }
        UserRepositoryError::Query { message } => {
            error!(%message, "user store query failed");
            Error::internal(message)
        }
        UserRepositoryError::DuplicateEmail { email } => {
            Error::conflict(format!("an account with email {email} already exists"))
        }
    }
}
