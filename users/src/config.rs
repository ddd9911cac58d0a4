//! Users service configuration loaded via OrthoConfig.
//!
//! Values come from CLI flags, `USERS_*` environment variables and config
//! files, in OrthoConfig's usual precedence.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::domain::{Credentials, UserValidationError};
use crate::outbound::crypto::JwtSettings;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_JWT_ISSUER: &str = "users";
const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;
const DEFAULT_CLOCK_SKEW_SECS: u64 = 30;
const DEFAULT_HASH_COST: u32 = 13;
const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 10;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// A setting is missing or unusable.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A required value was not supplied.
    #[error("{0} must be set")]
    Missing(&'static str),
    /// A value was supplied but cannot be used.
    #[error("{field} is invalid: {reason}")]
    Invalid {
        /// Setting name.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Configuration for the users service binary.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "USERS")]
#[serde(default)]
pub struct UsersSettings {
    /// Listen address.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// HMAC key for signing tokens.
    pub jwt_sign_key: Option<String>,
    /// Token issuer claim.
    pub jwt_issuer: Option<String>,
    /// Token lifetime in seconds.
    #[ortho_config(default = 3600)]
    pub jwt_token_ttl_secs: u64,
    /// How far `nbf` is backdated, in seconds.
    #[ortho_config(default = 30)]
    pub jwt_clock_skew_secs: u64,
    /// bcrypt work factor.
    #[ortho_config(default = 13)]
    pub password_hash_cost: u32,
    /// Graceful shutdown budget in seconds.
    #[ortho_config(default = 10)]
    pub shutdown_timeout_secs: u64,
    /// Upper bound on pooled database connections.
    #[ortho_config(default = 10)]
    pub db_max_connections: u32,
    /// Email of an administrator to create at startup.
    pub bootstrap_admin_email: Option<String>,
    /// Password for the bootstrap administrator.
    pub bootstrap_admin_password: Option<String>,
}

impl Default for UsersSettings {
    fn default() -> Self {
        Self {
            bind_addr: None,
            database_url: None,
            jwt_sign_key: None,
            jwt_issuer: None,
            jwt_token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            jwt_clock_skew_secs: DEFAULT_CLOCK_SKEW_SECS,
            password_hash_cost: DEFAULT_HASH_COST,
            shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            bootstrap_admin_email: None,
            bootstrap_admin_password: None,
        }
    }
}

impl UsersSettings {
    /// Listen address, defaulting to all interfaces on port 8080.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        match self.bind_addr {
            Some(addr) => Ok(addr),
            None => DEFAULT_BIND_ADDR
                .parse()
                .map_err(|err: std::net::AddrParseError| SettingsError::Invalid {
                    field: "bind_addr",
                    reason: err.to_string(),
                }),
        }
    }

    /// Database URL; required.
    pub fn database_url(&self) -> Result<Zeroizing<String>, SettingsError> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(|url| Zeroizing::new(url.to_owned()))
            .ok_or(SettingsError::Missing("database_url"))
    }

    /// Token signing parameters; the key is required and must not be blank.
    pub fn jwt(&self) -> Result<JwtSettings, SettingsError> {
        let key = self
            .jwt_sign_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(SettingsError::Missing("jwt_sign_key"))?;
        Ok(JwtSettings {
            sign_key: Zeroizing::new(key.to_owned()),
            issuer: self
                .jwt_issuer
                .clone()
                .unwrap_or_else(|| DEFAULT_JWT_ISSUER.to_owned()),
            ttl: Duration::from_secs(self.jwt_token_ttl_secs),
            clock_skew: Duration::from_secs(self.jwt_clock_skew_secs),
        })
    }

    /// bcrypt cost, bounded to 4..=31.
    pub fn password_hash_cost(&self) -> Result<u32, SettingsError> {
        let cost = self.password_hash_cost;
        if (4..=31).contains(&cost) {
            Ok(cost)
        } else {
            Err(SettingsError::Invalid {
                field: "password_hash_cost",
                reason: format!("{cost} is outside 4..=31"),
            })
        }
    }

    /// Graceful shutdown budget.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// Pool size.
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
    }

    /// Bootstrap administrator credentials, when configured.
    ///
    /// Both email and password must be given together.
    pub fn bootstrap_admin(&self) -> Result<Option<Credentials>, SettingsError> {
        match (
            self.bootstrap_admin_email.as_deref(),
            self.bootstrap_admin_password.as_deref(),
        ) {
            (None, None) => Ok(None),
            (Some(email), Some(password)) => Credentials::for_new_account(email, password)
                .map(Some)
                .map_err(|err: UserValidationError| SettingsError::Invalid {
                    field: "bootstrap_admin",
                    reason: err.to_string(),
                }),
            (Some(_), None) => Err(SettingsError::Missing("bootstrap_admin_password")),
            (None, Some(_)) => Err(SettingsError::Missing("bootstrap_admin_email")),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Configuration parsing against the process environment.

    use super::*;
    use std::ffi::OsString;
    use std::sync::Arc;

    use env_lock::lock_env;
    use mockable::DefaultClock;
    use rstest::rstest;

    use crate::outbound::crypto::JwtTokenCodec;

    const VARS: [&str; 11] = [
        "USERS_BIND_ADDR",
        "USERS_DATABASE_URL",
        "USERS_JWT_SIGN_KEY",
        "USERS_JWT_ISSUER",
        "USERS_JWT_TOKEN_TTL_SECS",
        "USERS_JWT_CLOCK_SKEW_SECS",
        "USERS_PASSWORD_HASH_COST",
        "USERS_SHUTDOWN_TIMEOUT_SECS",
        "USERS_DB_MAX_CONNECTIONS",
        "USERS_BOOTSTRAP_ADMIN_EMAIL",
        "USERS_BOOTSTRAP_ADMIN_PASSWORD",
    ];

    fn env_with(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    fn load() -> UsersSettings {
        UsersSettings::load_from_iter([OsString::from("users")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(env_with(&[]));

        let settings = load();

        assert_eq!(
            settings.bind_addr().expect("default address").to_string(),
            "0.0.0.0:8080"
        );
        assert!(matches!(
            settings.database_url(),
            Err(SettingsError::Missing("database_url"))
        ));
        assert!(matches!(
            settings.jwt(),
            Err(SettingsError::Missing("jwt_sign_key"))
        ));
        assert_eq!(settings.password_hash_cost().expect("cost"), 13);
        assert_eq!(settings.shutdown_timeout(), Duration::from_secs(10));
        assert_eq!(settings.db_max_connections(), 10);
        assert!(settings.bootstrap_admin().expect("optional").is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_with(&[
            ("USERS_BIND_ADDR", "127.0.0.1:9000"),
            ("USERS_DATABASE_URL", "postgres://db/users"),
            ("USERS_JWT_SIGN_KEY", "s3cret"),
            ("USERS_JWT_ISSUER", "dispatch"),
            ("USERS_JWT_TOKEN_TTL_SECS", "60"),
            ("USERS_PASSWORD_HASH_COST", "4"),
        ]));

        let settings = load();
        let jwt = settings.jwt().expect("jwt settings");

        assert_eq!(
            settings.bind_addr().expect("address").to_string(),
            "127.0.0.1:9000"
        );
        assert_eq!(
            settings.database_url().expect("url").as_str(),
            "postgres://db/users"
        );
        assert_eq!(jwt.issuer, "dispatch");
        assert_eq!(jwt.ttl, Duration::from_secs(60));
        assert_eq!(jwt.clock_skew, Duration::from_secs(30));
        assert_eq!(settings.password_hash_cost().expect("cost"), 4);
    }

    #[rstest]
    #[case::blank_key("USERS_JWT_SIGN_KEY", "   ")]
    #[case::cost_too_low("USERS_PASSWORD_HASH_COST", "3")]
    #[case::cost_too_high("USERS_PASSWORD_HASH_COST", "32")]
    fn unusable_values_are_reported(#[case] var: &str, #[case] value: &str) {
        let _guard = lock_env(env_with(&[(var, value)]));

        let settings = load();

        assert!(settings.jwt().is_err() || settings.password_hash_cost().is_err());
    }

    #[rstest]
    #[case::zero_ttl("USERS_JWT_TOKEN_TTL_SECS", "0")]
    #[case::ttl_beyond_maximum("USERS_JWT_TOKEN_TTL_SECS", "10000000000000")]
    #[case::skew_beyond_maximum("USERS_JWT_CLOCK_SKEW_SECS", "86400")]
    #[case::padded_key("USERS_JWT_SIGN_KEY", " s3cret ")]
    fn token_windows_are_checked_before_serving(#[case] var: &str, #[case] value: &str) {
        let mut overrides = vec![("USERS_JWT_SIGN_KEY", "s3cret")];
        overrides.retain(|(name, _)| *name != var);
        overrides.push((var, value));
        let _guard = lock_env(env_with(&overrides));

        let jwt = load().jwt().expect("key is present");

        assert!(JwtTokenCodec::new(&jwt, Arc::new(DefaultClock)).is_err());
    }

    #[rstest]
    fn bootstrap_admin_needs_both_halves() {
        let _guard = lock_env(env_with(&[("USERS_BOOTSTRAP_ADMIN_EMAIL", "root@x.com")]));

        let settings = load();

        assert!(matches!(
            settings.bootstrap_admin(),
            Err(SettingsError::Missing("bootstrap_admin_password"))
        ));
    }

    #[rstest]
    fn bootstrap_admin_is_validated() {
        let _guard = lock_env(env_with(&[
            ("USERS_BOOTSTRAP_ADMIN_EMAIL", "root@x.com"),
            ("USERS_BOOTSTRAP_ADMIN_PASSWORD", "pw123456"),
        ]));

        let credentials = load()
            .bootstrap_admin()
            .expect("valid")
            .expect("configured");

        assert_eq!(credentials.email().as_ref(), "root@x.com");
    }
}
