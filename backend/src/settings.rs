//! Service configuration loaded via OrthoConfig.
//!
//! Values come from `VIANDAS_*` environment variables, configuration files or
//! command-line flags, in OrthoConfig's usual precedence.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_ORACLE_TIMEOUT_MS: u64 = 3_000;
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Runtime settings for the container lifecycle service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "VIANDAS")]
pub struct ServiceSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL. Without it containers live in memory.
    pub database_url: Option<String>,
    /// Base URL of the fridge telemetry service.
    pub oracle_url: Option<String>,
    /// Timeout for a single telemetry request, in milliseconds.
    pub oracle_timeout_ms: Option<u64>,
    /// Upper bound on pooled database connections.
    pub pool_max_size: Option<u32>,
}

/// Errors raised when settings hold unusable values.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("bind address {value:?} is not a socket address")]
    BindAddr { value: String },
    #[error("oracle url {value:?} is not a valid URL: {message}")]
    OracleUrl { value: String, message: String },
}

impl ServiceSettings {
    /// Return the bind address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|_| SettingsError::BindAddr {
            value: raw.to_owned(),
        })
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
    }

    /// Parse the telemetry base URL when one is configured.
    pub fn oracle_url(&self) -> Result<Option<reqwest::Url>, SettingsError> {
        self.oracle_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .map(|raw| {
                reqwest::Url::parse(raw).map_err(|err| SettingsError::OracleUrl {
                    value: raw.to_owned(),
                    message: err.to_string(),
                })
            })
            .transpose()
    }

    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_millis(self.oracle_timeout_ms.unwrap_or(DEFAULT_ORACLE_TIMEOUT_MS))
    }

    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }
}
