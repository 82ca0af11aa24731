//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the container lifecycle endpoints, the health probes
//! and the schema wrappers from [`crate::inbound::http::schemas`]. The
//! document backs Swagger UI in debug builds and is printed by the
//! `openapi-dump` binary.

use crate::inbound::http::containers::{
    ChangeStatusRequestBody, ContainerResponseBody, CountersResponseBody, ExpirationResponseBody,
    ReassignFridgeRequestBody, RegisterContainerRequestBody,
};
use crate::inbound::http::schemas::{ContainerStatusSchema, ErrorCodeSchema, ErrorSchema};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Viandas container lifecycle API",
        description = "Registration, status tracking and expiry evaluation for meal containers kept in smart fridges."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::containers::register_container,
        crate::inbound::http::containers::reset_containers,
        crate::inbound::http::containers::search_containers,
        crate::inbound::http::containers::container_counters,
        crate::inbound::http::containers::get_container,
        crate::inbound::http::containers::evaluate_expiration,
        crate::inbound::http::containers::change_status,
        crate::inbound::http::containers::reassign_fridge,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        ContainerStatusSchema,
        RegisterContainerRequestBody,
        ChangeStatusRequestBody,
        ReassignFridgeRequestBody,
        ContainerResponseBody,
        ExpirationResponseBody,
        CountersResponseBody,
    )),
    tags(
        (name = "containers", description = "Meal container lifecycle"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
