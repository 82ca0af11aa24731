//! DTOs for decoding fridge telemetry responses.
//!
//! The telemetry service answers either with a bare array of readings or with
//! the array wrapped in a `temperatures` field. Readings carry a numeric
//! `temperature` (older deployments call it `temperatura`); other fields are
//! ignored.

use serde::Deserialize;

use crate::domain::TemperatureReading;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum TemperatureHistoryDto {
    Bare(Vec<TemperatureReadingDto>),
    Wrapped {
        temperatures: Vec<TemperatureReadingDto>,
    },
}

#[derive(Debug, Deserialize)]
pub(super) struct TemperatureReadingDto {
    #[serde(alias = "temperatura")]
    temperature: f64,
}

impl TemperatureHistoryDto {
    pub(super) fn into_domain_readings(self) -> Vec<TemperatureReading> {
        let readings = match self {
            Self::Bare(readings) | Self::Wrapped { temperatures: readings } => readings,
        };
        readings
            .into_iter()
            .map(|reading| TemperatureReading::new(reading.temperature))
            .collect()
    }
}
