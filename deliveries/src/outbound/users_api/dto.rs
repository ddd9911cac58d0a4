//! Wire shapes returned by the users service.

use serde::Deserialize;
use service_core::Role;

use crate::domain::{Caller, Courier, UserId};

/// Public account record.
#[derive(Debug, Deserialize)]
pub(super) struct UserDto {
    pub id: i64,
    pub email: String,
    pub role: Role,
}

/// `{"data": user}` as returned from `/auth`.
#[derive(Debug, Deserialize)]
pub(super) struct UserEnvelopeDto {
    pub data: UserDto,
}

impl UserDto {
    pub(super) fn into_caller(self) -> Caller {
        Caller::new(UserId::new(self.id), self.email, self.role)
    }

    /// The courier this record describes, if it is one.
    pub(super) fn into_courier(self) -> Option<Courier> {
        match self.role {
            Role::Courier => Some(Courier::new(UserId::new(self.id), self.email)),
            Role::User | Role::Admin => None,
        }
    }
}
