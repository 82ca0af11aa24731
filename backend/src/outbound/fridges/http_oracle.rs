//! Reqwest-backed temperature oracle.
//!
//! Owns transport details only: URL construction, timeout and HTTP error
//! mapping, and JSON decoding into domain readings.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use super::dto::TemperatureHistoryDto;
use crate::domain::ports::{TemperatureOracle, TemperatureOracleError};
use crate::domain::{FridgeId, TemperatureReading};

const USER_AGENT: &str = concat!("viandas/", env!("CARGO_PKG_VERSION"));

/// Temperature oracle reading `GET {base}/fridges/{id}/temperatures`.
pub struct HttpTemperatureOracle {
    client: Client,
    base_url: Url,
}

impl HttpTemperatureOracle {
    /// Build an oracle with an explicit request timeout.
    ///
    /// ```
    /// use std::time::Duration;
    /// use reqwest::Url;
    /// use viandas::outbound::fridges::HttpTemperatureOracle;
    ///
    /// let base = Url::parse("http://telemetry.local/api").expect("valid url");
    /// let oracle = HttpTemperatureOracle::new(base, Duration::from_secs(3));
    /// assert!(oracle.is_ok());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(mut base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint_for(&self, fridge_id: FridgeId) -> Result<Url, TemperatureOracleError> {
        self.base_url
            .join(&format!("fridges/{fridge_id}/temperatures"))
            .map_err(|error| TemperatureOracleError::transport(format!("invalid endpoint: {error}")))
    }
}

#[async_trait]
impl TemperatureOracle for HttpTemperatureOracle {
    async fn temperatures_for(
        &self,
        fridge_id: FridgeId,
    ) -> Result<Vec<TemperatureReading>, TemperatureOracleError> {
        let endpoint = self.endpoint_for(fridge_id)?;
        debug!(%endpoint, "requesting fridge temperatures");
        let response = self
            .client
            .get(endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        parse_readings(body.as_ref())
    }
}

fn parse_readings(body: &[u8]) -> Result<Vec<TemperatureReading>, TemperatureOracleError> {
    let decoded: TemperatureHistoryDto = serde_json::from_slice(body).map_err(|error| {
        TemperatureOracleError::decode(format!("invalid temperature payload: {error}"))
    })?;
    Ok(decoded.into_domain_readings())
}

fn map_transport_error(error: reqwest::Error) -> TemperatureOracleError {
    if error.is_timeout() {
        TemperatureOracleError::timeout(error.to_string())
    } else {
        TemperatureOracleError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> TemperatureOracleError {
    const PREVIEW_CHAR_LIMIT: usize = 120;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview: String = compact.chars().take(PREVIEW_CHAR_LIMIT).collect();

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            TemperatureOracleError::timeout(format!("status {}", status.as_u16()))
        }
        _ => TemperatureOracleError::rejected(status.as_u16(), preview),
    }
}
