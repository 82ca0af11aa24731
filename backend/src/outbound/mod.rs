//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed container repository using Diesel ORM
//! - **memory**: process-local container repository
//! - **fridges**: HTTP client for fridge temperature telemetry
//! - **metrics**: Prometheus exporters (feature-gated)
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod fridges;
pub mod memory;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod persistence;
