//! Domain ports.
//!
//! Driving ports (`Authenticator`, `AccountsCommand`, `CouriersQuery`) are
//! what inbound adapters call; driven ports (`UserRepository`,
//! `PasswordHasher`, `TokenCodec`) are what the domain services call out to.

mod accounts;
mod authenticator;
mod password_hasher;
mod token_codec;
mod user_repository;

#[cfg(test)]
pub use accounts::{MockAccountsCommand, MockCouriersQuery};
pub use accounts::{AccountsCommand, CouriersQuery};
#[cfg(test)]
pub use authenticator::MockAuthenticator;
pub use authenticator::Authenticator;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use token_codec::MockTokenCodec;
pub use token_codec::{IssuedToken, TokenClaims, TokenCodec, TokenError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
