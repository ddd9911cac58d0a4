//! HS256 JSON Web Token adapter for the `TokenCodec` port.
//!
//! Validity windows are checked against an injected [`Clock`] rather than
//! the library's wall-clock checks, so expiry can be exercised in tests.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::domain::ports::{IssuedToken, TokenClaims, TokenCodec, TokenError};
use crate::domain::{Email, User, UserId};

/// Signing parameters.
#[derive(Clone)]
pub struct JwtSettings {
    /// Shared HMAC secret.
    pub sign_key: Zeroizing<String>,
    /// Value written to and required in `iss`.
    pub issuer: String,
    /// Lifetime of an issued token.
    pub ttl: Duration,
    /// How far `nbf` is backdated to tolerate clock drift between services.
    pub clock_skew: Duration,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    iss: String,
    iat: i64,
    nbf: i64,
    exp: i64,
    jti: String,
}

/// Signs and verifies HS256 tokens.
#[derive(Clone)]
pub struct JwtTokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    ttl: TimeDelta,
    clock_skew: TimeDelta,
    clock: Arc<dyn Clock>,
}

/// Longest lifetime a token may be issued with.
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);
/// Largest `nbf` backdating accepted.
pub const MAX_CLOCK_SKEW: Duration = Duration::from_secs(60 * 60);

fn bounded(
    duration: Duration,
    min: Duration,
    max: Duration,
    what: &str,
) -> Result<TimeDelta, TokenError> {
    if duration < min || duration > max {
        return Err(TokenError::signing(format!(
            "{what} of {}s is outside {}s..={}s",
            duration.as_secs(),
            min.as_secs(),
            max.as_secs()
        )));
    }
    TimeDelta::from_std(duration)
        .map_err(|err| TokenError::signing(format!("{what} out of range: {err}")))
}

impl JwtTokenCodec {
    /// Build a codec from `settings`.
    ///
    /// # Errors
    ///
    /// [`TokenError::Signing`] when the key is empty or padded with
    /// whitespace, the TTL is zero or above [`MAX_TOKEN_TTL`], or the skew is
    /// above [`MAX_CLOCK_SKEW`].
    pub fn new(settings: &JwtSettings, clock: Arc<dyn Clock>) -> Result<Self, TokenError> {
        let key = settings.sign_key.as_str();
        if key.trim().is_empty() {
            return Err(TokenError::signing("signing key must not be empty"));
        }
        if key.trim() != key {
            return Err(TokenError::signing(
                "signing key must not start or end with whitespace",
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[settings.issuer.as_str()]);
        validation.set_required_spec_claims(&["sub", "iss", "exp", "nbf"]);
        validation.validate_exp = false;
        validation.validate_nbf = false;

        Ok(Self {
            encoding: EncodingKey::from_secret(key.as_bytes()),
            decoding: DecodingKey::from_secret(key.as_bytes()),
            validation,
            issuer: settings.issuer.clone(),
            ttl: bounded(settings.ttl, Duration::from_secs(1), MAX_TOKEN_TTL, "token ttl")?,
            clock_skew: bounded(settings.clock_skew, Duration::ZERO, MAX_CLOCK_SKEW, "clock skew")?,
            clock,
        })
    }

    fn timestamp(seconds: i64, claim: &str) -> Result<DateTime<Utc>, TokenError> {
        DateTime::from_timestamp(seconds, 0)
            .ok_or_else(|| TokenError::invalid(format!("{claim} is not a valid timestamp")))
    }
}

impl TokenCodec for JwtTokenCodec {
    fn issue(&self, user: &User) -> Result<IssuedToken, TokenError> {
        let now = self.clock.utc();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenError::signing("expiry does not fit a timestamp"))?;
        let not_before = now
            .checked_sub_signed(self.clock_skew)
            .ok_or_else(|| TokenError::signing("not-before does not fit a timestamp"))?;
        let claims = Claims {
            sub: user.id().to_string(),
            email: user.email().to_string(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            nbf: not_before.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| TokenError::signing(err.to_string()))?;
        Ok(IssuedToken { token, expires_at })
    }

    fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|err| TokenError::invalid(format!("{:?}", err.kind())))?
            .claims;

        let now = self.clock.utc().timestamp();
        if now < claims.nbf {
            return Err(TokenError::invalid("ImmatureSignature"));
        }
        if now >= claims.exp {
            return Err(TokenError::invalid("ExpiredSignature"));
        }

        let user_id: UserId = claims
            .sub
            .parse()
            .map_err(|_| TokenError::invalid("sub is not a user id"))?;
        let email =
            Email::new(&claims.email).map_err(|_| TokenError::invalid("email claim is malformed"))?;

        Ok(TokenClaims {
            user_id,
            email,
            expires_at: Self::timestamp(claims.exp, "exp")?,
        })
    }
}
