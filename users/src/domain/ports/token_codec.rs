//! Port for issuing and verifying bearer tokens.

use chrono::{DateTime, Utc};
use serde::Serialize;
use service_core::define_port_error;
use utoipa::ToSchema;

use crate::domain::{Email, User, UserId};

define_port_error! {
    /// Token failures. Every verification failure is reported as `Invalid`
    /// so callers cannot distinguish tampering from expiry.
    pub enum TokenError {
        /// Malformed, expired, not yet valid, wrongly signed, or using an
        /// unexpected algorithm.
        Invalid { reason: String } => "invalid token: {reason}",
        /// A token could not be signed.
        Signing { message: String } => "token signing failed: {message}",
    }
}

/// A freshly signed token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    /// Compact JWS form.
    pub token: String,
    /// Instant after which the token is rejected.
    pub expires_at: DateTime<Utc>,
}

/// Claims recovered from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// Account the token was issued to.
    pub user_id: UserId,
    /// Email of the account at issuance.
    pub email: Email,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}

/// Sign and verify bearer tokens.
#[cfg_attr(test, mockall::automock)]
pub trait TokenCodec: Send + Sync {
    /// Sign a token binding the user's id and email.
    fn issue(&self, user: &User) -> Result<IssuedToken, TokenError>;

    /// Verify signature, algorithm, issuer, and validity window.
    fn verify(&self, token: &str) -> Result<TokenClaims, TokenError>;
}
