//! Account roles shared by both services.
//!
//! The users service assigns a role when an account is created and embeds it
//! in the identity returned from `/auth`; the deliveries service reads it back
//! to gate its routes. Authorisation checkpoints match on [`Role`]
//! exhaustively so adding a role forces every policy to be revisited.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Closed set of account roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A customer who requests deliveries.
    User,
    /// An operator who administers couriers and assignments.
    Admin,
    /// A courier who carries out assigned deliveries.
    Courier,
}

/// Raised when a stored or transmitted role label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct RoleParseError(pub String);

impl Role {
    /// Wire and storage label for the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Courier => "courier",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "courier" => Ok(Self::Courier),
            other => Err(RoleParseError(other.to_owned())),
        }
    }
}
