//! Outbound adapters for metrics exporting.
//!
//! Prometheus-backed exporters, feature-gated behind the `metrics` feature.

mod prometheus_container_gauges;

pub use prometheus_container_gauges::PrometheusContainerGauges;
