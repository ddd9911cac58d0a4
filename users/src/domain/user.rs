//! User accounts and the validated values they are built from.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use service_core::Role;
use utoipa::ToSchema;
use zeroize::Zeroizing;

const EMAIL_MAX_LEN: usize = 254;
const PASSWORD_MIN_CHARS: usize = 8;
// bcrypt ignores input past this many bytes.
const PASSWORD_MAX_BYTES: usize = 72;

/// Store-assigned user identifier.
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

/// Account standing; only `Active` accounts may log in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Normal account.
    Active,
    /// Temporarily suspended.
    Frozen,
    /// Permanently barred.
    Blocked,
}

impl AccountStatus {
    /// Storage label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Frozen => "frozen",
            Self::Blocked => "blocked",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountStatus {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "frozen" => Ok(Self::Frozen),
            "blocked" => Ok(Self::Blocked),
            other => Err(UserValidationError::UnknownStatus(other.to_owned())),
        }
    }
}

/// Validation failures for user-facing inputs and stored rows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Email is blank.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Email does not look like `local@domain.tld`.
    #[error("email is not a valid address")]
    MalformedEmail,
    /// Email exceeds the RFC 5321 path limit.
    #[error("email must be at most 254 characters")]
    EmailTooLong,
    /// Password is blank.
    #[error("password must not be empty")]
    EmptyPassword,
    /// Password is shorter than the policy minimum.
    #[error("password must be at least 8 characters")]
    PasswordTooShort,
    /// Password would be truncated by the hash function.
    #[error("password must be at most 72 bytes")]
    PasswordTooLong,
    /// Stored status label is not recognised.
    #[error("unknown account status: {0}")]
    UnknownStatus(String),
}

/// Normalised (trimmed, lowercase) email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and normalise an address.
    ///
    /// # Examples
    /// ```
    /// use users::domain::Email;
    ///
    /// let email = Email::new("  A@X.com ").expect("valid email");
    /// assert_eq!(email.as_ref(), "a@x.com");
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if trimmed.chars().count() > EMAIL_MAX_LEN {
            return Err(UserValidationError::EmailTooLong);
        }
        let (local, domain) = trimmed
            .split_once('@')
            .ok_or(UserValidationError::MalformedEmail)?;
        let domain_ok = domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty());
        if local.is_empty()
            || domain.contains('@')
            || !domain_ok
            || trimmed.chars().any(char::is_whitespace)
        {
            return Err(UserValidationError::MalformedEmail);
        }
        Ok(Self(trimmed.to_lowercase()))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

/// Plain-text password held only as long as hashing or verification needs
/// it; the buffer is wiped on drop.
#[derive(Clone)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Accept any non-empty password. Used for login, where the policy in
    /// force when the account was created does not matter.
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = Zeroizing::new(raw.into());
        if raw.is_empty() {
            return Err(UserValidationError::EmptyPassword);
        }
        Ok(Self(raw))
    }

    /// Accept a password that satisfies the account creation policy.
    pub fn new_for_account(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let password = Self::new(raw)?;
        if password.0.chars().count() < PASSWORD_MIN_CHARS {
            return Err(UserValidationError::PasswordTooShort);
        }
        if password.0.len() > PASSWORD_MAX_BYTES {
            return Err(UserValidationError::PasswordTooLong);
        }
        Ok(password)
    }

    /// Borrow the secret for hashing or verification.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(**redacted**)")
    }
}

/// Email/password pair submitted to login or account creation.
#[derive(Debug, Clone)]
pub struct Credentials {
    email: Email,
    password: Password,
}

impl Credentials {
    /// Build login credentials.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, UserValidationError> {
        Ok(Self {
            email: Email::new(email)?,
            password: Password::new(password)?,
        })
    }

    /// Build credentials for a new account, applying the password policy.
    pub fn for_new_account(email: &str, password: &str) -> Result<Self, UserValidationError> {
        Ok(Self {
            email: Email::new(email)?,
            password: Password::new_for_account(password)?,
        })
    }

    /// Submitted email.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// Submitted password.
    #[must_use]
    pub const fn password(&self) -> &Password {
        &self.password
    }
}

/// Opaque password hash as produced by the hasher adapter.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded hash string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

/// A stored account.
///
/// The password hash never leaves the service: it is skipped when the user
/// is serialised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    #[schema(value_type = String, example = "courier@example.com")]
    email: Email,
    role: Role,
    status: AccountStatus,
    #[serde(skip)]
    password_hash: PasswordHash,
}

impl User {
    /// Assemble a user from stored parts.
    #[must_use]
    pub const fn new(
        id: UserId,
        email: Email,
        role: Role,
        status: AccountStatus,
        password_hash: PasswordHash,
    ) -> Self {
        Self {
            id,
            email,
            role,
            status,
            password_hash,
        }
    }

    /// Identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Email address.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// Role fixed at creation.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Account standing.
    #[must_use]
    pub const fn status(&self) -> AccountStatus {
        self.status
    }

    /// Stored password hash.
    #[must_use]
    pub const fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }
}

/// Account waiting to be inserted; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Email address, unique across accounts.
    pub email: Email,
    /// Hash of the chosen password.
    pub password_hash: PasswordHash,
    /// Role granted at creation.
    pub role: Role,
    /// Initial standing.
    pub status: AccountStatus,
}
