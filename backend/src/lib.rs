//! Meal container lifecycle service.
//!
//! Hexagonal layout: [`domain`] holds the lifecycle rules and ports,
//! [`inbound`] drives them over HTTP and [`outbound`] implements storage,
//! telemetry and metrics adapters.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
