//! Delivery records and the lifecycle rules that govern them.
//!
//! ```text
//! created --assign--> delivers --assign--> delivers --complete--> completed
//! ```
//!
//! `canceled` is a recognised status but no operation produces it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::identity::UserId;

/// Store-assigned delivery identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct DeliveryId(i64);

impl DeliveryId {
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

impl fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a delivery is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    /// Requested by a user, no courier yet.
    Created,
    /// A courier is carrying it.
    Delivers,
    /// Handed over; terminal.
    Completed,
    /// Withdrawn; terminal.
    Canceled,
}

impl DeliveryStatus {
    /// Storage and wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Delivers => "delivers",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
        }
    }

    /// Whether a courier may be (re)assigned from this status.
    #[must_use]
    pub const fn is_courier_assignable(self) -> bool {
        match self {
            Self::Created | Self::Delivers => true,
            Self::Completed | Self::Canceled => false,
        }
    }

    /// Whether the delivery may be marked complete from this status.
    #[must_use]
    pub const fn is_completable(self) -> bool {
        match self {
            Self::Delivers => true,
            Self::Created | Self::Completed | Self::Canceled => false,
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored status label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown delivery status: {0}")]
pub struct StatusParseError(pub String);

impl FromStr for DeliveryStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "delivers" => Ok(Self::Delivers),
            "completed" => Ok(Self::Completed),
            "canceled" => Ok(Self::Canceled),
            other => Err(StatusParseError(other.to_owned())),
        }
    }
}

/// A lifecycle operation that may be refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Hand the delivery to a courier.
    Assign,
    /// Mark the delivery handed over.
    Complete,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Assign => "assign",
            Self::Complete => "complete",
        })
    }
}

/// The requested transition is illegal from the current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot {operation} a delivery that is {status}")]
pub struct TransitionRejected {
    /// What was attempted.
    pub operation: Transition,
    /// Status at the time of the attempt.
    pub status: DeliveryStatus,
}

/// Destination text was unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DestinationError {
    /// Nothing but whitespace.
    #[error("destination must not be empty")]
    Empty,
}

/// Trimmed, non-empty free-text destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "Main St 1")]
pub struct Destination(String);

impl Destination {
    /// Validate a destination.
    ///
    /// # Examples
    /// ```
    /// use deliveries::domain::Destination;
    ///
    /// let destination = Destination::new("  Main St 1 ").expect("valid destination");
    /// assert_eq!(destination.as_ref(), "Main St 1");
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, DestinationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DestinationError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Destination {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Destination {
    type Error = DestinationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Destination> for String {
    fn from(value: Destination) -> Self {
        value.0
    }
}

/// Optimistic concurrency token; starts at 1 and grows with every persisted
/// transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version(i32);

impl Version {
    /// Version of a freshly inserted delivery.
    pub const INITIAL: Self = Self(1);

    /// Wrap a stored version.
    #[must_use]
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// The raw counter.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }

    /// The version a successful write produces.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// A stored delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    id: DeliveryId,
    status: DeliveryStatus,
    destination: Destination,
    recipient_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    courier_id: Option<UserId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    version: Version,
}

/// Stored parts of a delivery, as read back from a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryParts {
    /// Identifier.
    pub id: DeliveryId,
    /// Lifecycle status.
    pub status: DeliveryStatus,
    /// Destination text.
    pub destination: Destination,
    /// Requesting user.
    pub recipient_id: UserId,
    /// Assigned courier.
    pub courier_id: Option<UserId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last transition time.
    pub updated_at: DateTime<Utc>,
    /// Concurrency token.
    pub version: Version,
}

impl From<DeliveryParts> for Delivery {
    fn from(parts: DeliveryParts) -> Self {
        Self {
            id: parts.id,
            status: parts.status,
            destination: parts.destination,
            recipient_id: parts.recipient_id,
            courier_id: parts.courier_id,
            created_at: parts.created_at,
            updated_at: parts.updated_at,
            version: parts.version,
        }
    }
}

impl Delivery {
    /// Split into stored parts.
    #[must_use]
    pub fn into_parts(self) -> DeliveryParts {
        DeliveryParts {
            id: self.id,
            status: self.status,
            destination: self.destination,
            recipient_id: self.recipient_id,
            courier_id: self.courier_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            version: self.version,
        }
    }

    /// Identifier.
    #[must_use]
    pub const fn id(&self) -> DeliveryId {
        self.id
    }

    /// Lifecycle status.
    #[must_use]
    pub const fn status(&self) -> DeliveryStatus {
        self.status
    }

    /// Destination text.
    #[must_use]
    pub const fn destination(&self) -> &Destination {
        &self.destination
    }

    /// The user who requested the delivery.
    #[must_use]
    pub const fn recipient_id(&self) -> UserId {
        self.recipient_id
    }

    /// The assigned courier, if any.
    #[must_use]
    pub const fn courier_id(&self) -> Option<UserId> {
        self.courier_id
    }

    /// Creation time.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Time of the last transition.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Version this copy was read at.
    #[must_use]
    pub const fn version(&self) -> Version {
        self.version
    }

    /// Whether `courier` may act on this delivery as its courier.
    ///
    /// True when `courier` is the assigned courier.
    #[must_use]
    pub fn is_assigned_to(&self, courier: UserId) -> bool {
        self.courier_id == Some(courier)
    }

    /// The delivery after handing it to `courier` at `at`.
    ///
    /// The version is left as read; the store bumps it when it accepts the
    /// write.
    ///
    /// # Errors
    ///
    /// [`TransitionRejected`] when the status does not allow assignment.
    pub fn assigned_to(&self, courier: UserId, at: DateTime<Utc>) -> Result<Self, TransitionRejected> {
        if !self.status.is_courier_assignable() {
            return Err(TransitionRejected {
                operation: Transition::Assign,
                status: self.status,
            });
        }
        Ok(Self {
            status: DeliveryStatus::Delivers,
            courier_id: Some(courier),
            updated_at: at,
            ..self.clone()
        })
    }

    /// The delivery after completing it at `at`; the courier is unchanged.
    ///
    /// # Errors
    ///
    /// [`TransitionRejected`] unless the delivery is being delivered.
    pub fn completed(&self, at: DateTime<Utc>) -> Result<Self, TransitionRejected> {
        if !self.status.is_completable() {
            return Err(TransitionRejected {
                operation: Transition::Complete,
                status: self.status,
            });
        }
        Ok(Self {
            status: DeliveryStatus::Completed,
            updated_at: at,
            ..self.clone()
        })
    }
}

/// Delivery waiting to be inserted; the store assigns id and version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDelivery {
    /// Where it goes.
    pub destination: Destination,
    /// Who asked for it.
    pub recipient_id: UserId,
    /// Construction time, used for both timestamps.
    pub created_at: DateTime<Utc>,
}
