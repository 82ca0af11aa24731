//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use reqwest::Url;
use viandas::outbound::persistence::DbPool;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

/// Telemetry endpoint used to evaluate container expiry.
#[derive(Debug, Clone)]
pub struct OracleEndpoint {
    pub(crate) base_url: Url,
    pub(crate) timeout: Duration,
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) oracle: Option<OracleEndpoint>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            db_pool: None,
            oracle: None,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Attach a database connection pool. Without one, containers are kept
    /// in process memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Point expiry evaluation at a fridge telemetry service. Without one,
    /// evaluations fail as unavailable.
    #[must_use]
    pub fn with_oracle(mut self, base_url: Url, timeout: Duration) -> Self {
        self.oracle = Some(OracleEndpoint { base_url, timeout });
        self
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
