//! Accounts as seen from the deliveries side: resolved by the users service,
//! never stored here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use service_core::Role;
use utoipa::ToSchema;

/// Identifier of an account held by the users service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// The raw identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// The authenticated account behind an inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    id: UserId,
    email: String,
    role: Role,
}

impl Caller {
    /// Identity as reported by the users service.
    pub fn new(id: UserId, email: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            email: email.into(),
            role,
        }
    }

    /// Account id.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Account email.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Account role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }
}

/// A courier account confirmed by the users service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Courier {
    id: UserId,
    email: String,
}

impl Courier {
    /// Courier with the given id and email.
    pub fn new(id: UserId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
        }
    }

    /// Account id.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Account email.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}
