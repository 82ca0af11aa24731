//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. The
//! wrappers here mirror their domain counterparts for documentation only.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// The referenced container does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The requested lifecycle transition is not allowed.
    #[schema(rename = "invalid_transition")]
    InvalidTransition,
    /// Fridge temperature telemetry could not be obtained.
    #[schema(rename = "oracle_unavailable")]
    OracleUnavailable,
    /// The container store is unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// API error response payload with machine-readable code and human-readable
/// message.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_transition")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "container QR1 is expired")]
    message: String,
    /// Correlation identifier echoed in the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details for clients.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::ContainerStatus`].
#[derive(ToSchema)]
pub enum ContainerStatusSchema {
    #[schema(rename = "prepared")]
    Prepared,
    #[schema(rename = "in_transit")]
    InTransit,
    #[schema(rename = "expired")]
    Expired,
}
