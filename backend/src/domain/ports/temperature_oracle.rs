//! Port for fridge temperature telemetry.
//!
//! The lifecycle service asks the oracle for the readings of a container's
//! current fridge when deciding whether the container has spoiled. Adapters
//! must report failures as errors; an empty reading list means "no evidence
//! of spoilage", never "telemetry down".

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{FridgeId, TemperatureReading};

use super::define_port_error;

define_port_error! {
    /// Errors raised by temperature oracle adapters.
    pub enum TemperatureOracleError {
        /// No telemetry endpoint has been configured.
        Unconfigured =>
            "fridge telemetry endpoint is not configured",
        /// The upstream did not answer within the client timeout.
        Timeout { message: String } =>
            "fridge telemetry timed out: {message}",
        /// Connection or protocol failure reaching the upstream.
        Transport { message: String } =>
            "fridge telemetry transport failed: {message}",
        /// The upstream answered with a non-success status.
        Rejected { status: u16, message: String } =>
            "fridge telemetry rejected request with status {status}: {message}",
        /// The upstream payload could not be decoded.
        Decode { message: String } =>
            "fridge telemetry payload was invalid: {message}",
    }
}

/// Port returning the temperature history recorded for a fridge.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TemperatureOracle: Send + Sync {
    /// Readings for `fridge_id`, in no particular order.
    async fn temperatures_for(
        &self,
        fridge_id: FridgeId,
    ) -> Result<Vec<TemperatureReading>, TemperatureOracleError>;
}

/// Oracle used when no telemetry endpoint is configured. Every query fails,
/// so expiry checks surface as unavailable rather than "not expired".
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredTemperatureOracle;

#[async_trait]
impl TemperatureOracle for UnconfiguredTemperatureOracle {
    async fn temperatures_for(
        &self,
        _fridge_id: FridgeId,
    ) -> Result<Vec<TemperatureReading>, TemperatureOracleError> {
        Err(TemperatureOracleError::unconfigured())
    }
}

/// Fixture oracle serving canned readings per fridge. Unknown fridges report
/// no readings.
///
/// # Examples
/// ```
/// use viandas::domain::FridgeId;
/// use viandas::domain::ports::{FixtureTemperatureOracle, TemperatureOracle};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let fridge = FridgeId::new(3).expect("valid fridge");
/// let oracle = FixtureTemperatureOracle::default().with_readings(fridge, [3.0, 6.0]);
/// let readings = oracle.temperatures_for(fridge).await.expect("fixture readings");
/// assert_eq!(readings.len(), 2);
/// # });
/// ```
#[derive(Debug, Default, Clone)]
pub struct FixtureTemperatureOracle {
    readings: HashMap<FridgeId, Vec<TemperatureReading>>,
}

impl FixtureTemperatureOracle {
    /// Serve `celsius` readings for `fridge_id`.
    pub fn with_readings(
        mut self,
        fridge_id: FridgeId,
        celsius: impl IntoIterator<Item = f64>,
    ) -> Self {
        self.readings.insert(
            fridge_id,
            celsius.into_iter().map(TemperatureReading::new).collect(),
        );
        self
    }
}

#[async_trait]
impl TemperatureOracle for FixtureTemperatureOracle {
    async fn temperatures_for(
        &self,
        fridge_id: FridgeId,
    ) -> Result<Vec<TemperatureReading>, TemperatureOracleError> {
        Ok(self.readings.get(&fridge_id).cloned().unwrap_or_default())
    }
}
