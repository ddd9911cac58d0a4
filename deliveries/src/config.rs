//! Deliveries service configuration loaded via OrthoConfig.
//!
//! Values come from CLI flags, `DELIVERIES_*` environment variables and
//! config files, in OrthoConfig's usual precedence.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;
use zeroize::Zeroizing;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8081";
const DEFAULT_HTTP_CLIENT_TIMEOUT_SECS: u64 = 10;
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

/// Configuration for the deliveries service binary.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DELIVERIES")]
#[serde(default)]
pub struct DeliveriesSettings {
    /// Listen address.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Base URL of the users service.
    pub users_base_url: Option<String>,
    /// Timeout for calls to the users service, in seconds.
    #[ortho_config(default = 10)]
    pub http_client_timeout_secs: u64,
    /// Graceful shutdown budget in seconds.
    #[ortho_config(default = 10)]
    pub shutdown_timeout_secs: u64,
    /// Upper bound on pooled database connections.
    #[ortho_config(default = 10)]
    pub db_max_connections: u32,
}

impl Default for DeliveriesSettings {
    fn default() -> Self {
        Self {
            bind_addr: None,
            database_url: None,
            users_base_url: None,
            http_client_timeout_secs: DEFAULT_HTTP_CLIENT_TIMEOUT_SECS,
            shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
        }
    }
}

impl DeliveriesSettings {
    /// Listen address, defaulting to all interfaces on port 8081.
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

    /// Users service base URL; required, `http` or `https`.
    pub fn users_base_url(&self) -> Result<Url, SettingsError> {
        let raw = self
            .users_base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(SettingsError::Missing("users_base_url"))?;
        let url = Url::parse(raw).map_err(|err| SettingsError::Invalid {
            field: "users_base_url",
            reason: err.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(SettingsError::Invalid {
                field: "users_base_url",
                reason: format!("unsupported scheme {other}"),
            }),
        }
    }

    /// Timeout for calls to the users service.
    pub fn http_client_timeout(&self) -> Duration {
        Duration::from_secs(self.http_client_timeout_secs)
    }

    /// Graceful shutdown budget.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// Pool size.
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
    }
}
