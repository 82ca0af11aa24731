//! Fridge temperature readings and the expiry rule.

use serde::{Deserialize, Serialize};

/// A reading at or above this temperature (degrees Celsius) spoils every
/// container in the fridge.
pub const EXPIRY_THRESHOLD_CELSIUS: f64 = 5.0;

/// One temperature sample reported for a fridge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureReading {
    celsius: f64,
}

impl TemperatureReading {
    pub fn new(celsius: f64) -> Self {
        Self { celsius }
    }

    pub fn celsius(&self) -> f64 {
        self.celsius
    }

    /// Whether this reading alone spoils the fridge contents.
    pub fn breaches_threshold(&self) -> bool {
        self.celsius >= EXPIRY_THRESHOLD_CELSIUS
    }
}

/// Whether any reading confirms expiry. Order is irrelevant and an empty
/// history never expires a container.
///
/// # Examples
/// ```
/// use viandas::domain::{readings_confirm_expiry, TemperatureReading};
///
/// let readings = [TemperatureReading::new(3.0), TemperatureReading::new(6.0)];
/// assert!(readings_confirm_expiry(&readings));
/// assert!(!readings_confirm_expiry(&[TemperatureReading::new(1.0)]));
/// ```
pub fn readings_confirm_expiry(readings: &[TemperatureReading]) -> bool {
    readings.iter().any(TemperatureReading::breaches_threshold)
}
