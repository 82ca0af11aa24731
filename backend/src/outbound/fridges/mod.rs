//! Fridge telemetry adapters.
//!
//! A thin HTTP implementation of the `TemperatureOracle` port.

mod dto;
mod http_oracle;

pub use http_oracle::HttpTemperatureOracle;
