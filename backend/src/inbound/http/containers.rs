//! Container lifecycle HTTP handlers.
//!
//! ```text
//! POST   /api/v1/containers
//! DELETE /api/v1/containers
//! GET    /api/v1/containers/search?collaboratorId=&month=&year=
//! GET    /api/v1/containers/counters
//! GET    /api/v1/containers/{code}
//! GET    /api/v1/containers/{code}/expired
//! PATCH  /api/v1/containers/{code}/status
//! PATCH  /api/v1/containers/{code}/fridge
//! ```

use std::str::FromStr;

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{
    ChangeContainerStatusRequest, CollaboratorMonthRequest, ContainerPayload, ExpirationOutcome,
    ReassignFridgeRequest, RegisterContainerRequest,
};
use crate::domain::{ContainerDraft, ContainerStatus, Error, StatusTally};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ContainerStatusSchema, ErrorSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_status_error, parse_optional_rfc3339_timestamp, require,
};

/// Request payload for registering a container.
///
/// Any `status` supplied by the client is accepted but ignored: new
/// containers always start out prepared.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterContainerRequestBody {
    #[schema(example = "QR-2024-0001")]
    pub code: Option<String>,
    pub collaborator_id: Option<i64>,
    pub fridge_id: Option<i64>,
    #[schema(value_type = Option<ContainerStatusSchema>)]
    pub status: Option<String>,
    #[schema(format = "date-time")]
    pub prepared_at: Option<String>,
}

/// Request payload for a status change.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatusRequestBody {
    #[schema(value_type = ContainerStatusSchema)]
    pub status: String,
}

/// Request payload for moving a container to another fridge.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReassignFridgeRequestBody {
    pub fridge_id: Option<i64>,
}

/// Query parameters for the collaborator history search.
#[derive(Debug, Deserialize, Serialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Collaborator who prepared the containers.
    pub collaborator_id: i64,
    /// Calendar month, 1 to 12.
    pub month: u32,
    /// Calendar year.
    pub year: i32,
}

/// Container representation returned by every lifecycle endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContainerResponseBody {
    pub code: String,
    pub collaborator_id: i64,
    pub fridge_id: i64,
    #[schema(value_type = ContainerStatusSchema)]
    pub status: String,
    #[schema(format = "date-time")]
    pub prepared_at: String,
}

impl From<ContainerPayload> for ContainerResponseBody {
    fn from(value: ContainerPayload) -> Self {
        Self {
            code: value.code,
            collaborator_id: value.collaborator_id,
            fridge_id: value.fridge_id,
            status: value.status.as_str().to_owned(),
            prepared_at: value.prepared_at.to_rfc3339(),
        }
    }
}

/// Result of an expiration evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpirationResponseBody {
    pub code: String,
    pub expired: bool,
}

impl From<ExpirationOutcome> for ExpirationResponseBody {
    fn from(value: ExpirationOutcome) -> Self {
        Self {
            code: value.code,
            expired: value.expired,
        }
    }
}

/// Current number of containers in each lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CountersResponseBody {
    pub prepared: i64,
    pub in_transit: i64,
    pub expired: i64,
}

impl From<StatusTally> for CountersResponseBody {
    fn from(value: StatusTally) -> Self {
        Self {
            prepared: value.prepared,
            in_transit: value.in_transit,
            expired: value.expired,
        }
    }
}

fn parse_status(raw: &str) -> Result<ContainerStatus, Error> {
    ContainerStatus::from_str(raw).map_err(|_| invalid_status_error(FieldName::new("status"), raw))
}

fn parse_registration(body: RegisterContainerRequestBody) -> Result<ContainerDraft, Error> {
    let RegisterContainerRequestBody {
        code,
        collaborator_id,
        fridge_id,
        status: _,
        prepared_at,
    } = body;
    Ok(ContainerDraft {
        code: require(code, FieldName::new("code"))?,
        collaborator_id: require(collaborator_id, FieldName::new("collaboratorId"))?,
        fridge_id: require(fridge_id, FieldName::new("fridgeId"))?,
        prepared_at: parse_optional_rfc3339_timestamp(
            prepared_at,
            FieldName::new("preparedAt"),
        )?,
    })
}

/// Register a new container in the prepared state.
#[utoipa::path(
    post,
    path = "/api/v1/containers",
    request_body = RegisterContainerRequestBody,
    responses(
        (status = 201, description = "Container registered", body = ContainerResponseBody),
        (status = 400, description = "Invalid or duplicate container", body = ErrorSchema),
        (status = 503, description = "Container store unavailable", body = ErrorSchema)
    ),
    tags = ["containers"],
    operation_id = "registerContainer"
)]
#[post("/containers")]
pub async fn register_container(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterContainerRequestBody>,
) -> ApiResult<HttpResponse> {
    let draft = parse_registration(payload.into_inner())?;
    let created = state
        .containers
        .register(RegisterContainerRequest { draft })
        .await?;
    Ok(HttpResponse::Created().json(ContainerResponseBody::from(created)))
}

/// Delete every container and zero the counters.
#[utoipa::path(
    delete,
    path = "/api/v1/containers",
    responses(
        (status = 204, description = "All containers removed"),
        (status = 503, description = "Container store unavailable", body = ErrorSchema)
    ),
    tags = ["containers"],
    operation_id = "resetContainers"
)]
#[delete("/containers")]
pub async fn reset_containers(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    state.containers.reset_all().await?;
    info!("container store reset over HTTP");
    Ok(HttpResponse::NoContent().finish())
}

/// List a collaborator's containers prepared in one calendar month.
#[utoipa::path(
    get,
    path = "/api/v1/containers/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching containers", body = [ContainerResponseBody]),
        (status = 400, description = "Invalid query", body = ErrorSchema)
    ),
    tags = ["containers"],
    operation_id = "searchContainers"
)]
#[get("/containers/search")]
pub async fn search_containers(
    state: web::Data<HttpState>,
    params: web::Query<SearchParams>,
) -> ApiResult<web::Json<Vec<ContainerResponseBody>>> {
    let SearchParams {
        collaborator_id,
        month,
        year,
    } = params.into_inner();
    let containers = state
        .containers_query
        .containers_for_collaborator(CollaboratorMonthRequest {
            collaborator_id,
            month,
            year,
        })
        .await?;
    Ok(web::Json(
        containers
            .into_iter()
            .map(ContainerResponseBody::from)
            .collect(),
    ))
}

/// Current per-status container counts.
#[utoipa::path(
    get,
    path = "/api/v1/containers/counters",
    responses(
        (status = 200, description = "Counter snapshot", body = CountersResponseBody)
    ),
    tags = ["containers"],
    operation_id = "containerCounters"
)]
#[get("/containers/counters")]
pub async fn container_counters(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<CountersResponseBody>> {
    let tally = state.containers_query.counters().await?;
    Ok(web::Json(tally.into()))
}

/// Look up a container by its scan code.
#[utoipa::path(
    get,
    path = "/api/v1/containers/{code}",
    params(("code" = String, Path, description = "Container scan code")),
    responses(
        (status = 200, description = "Container", body = ContainerResponseBody),
        (status = 404, description = "Unknown container", body = ErrorSchema)
    ),
    tags = ["containers"],
    operation_id = "getContainer"
)]
#[get("/containers/{code}")]
pub async fn get_container(
    state: web::Data<HttpState>,
    code: web::Path<String>,
) -> ApiResult<web::Json<ContainerResponseBody>> {
    let container = state.containers_query.find_by_code(&code).await?;
    Ok(web::Json(container.into()))
}

/// Evaluate whether a container has expired, recording the expiry if so.
#[utoipa::path(
    get,
    path = "/api/v1/containers/{code}/expired",
    params(("code" = String, Path, description = "Container scan code")),
    responses(
        (status = 200, description = "Evaluation result", body = ExpirationResponseBody),
        (status = 404, description = "Unknown container", body = ErrorSchema),
        (status = 503, description = "Temperature telemetry unavailable", body = ErrorSchema)
    ),
    tags = ["containers"],
    operation_id = "evaluateExpiration"
)]
#[get("/containers/{code}/expired")]
pub async fn evaluate_expiration(
    state: web::Data<HttpState>,
    code: web::Path<String>,
) -> ApiResult<web::Json<ExpirationResponseBody>> {
    let outcome = state.containers.evaluate_expiration(&code).await?;
    Ok(web::Json(outcome.into()))
}

/// Move a container to a new lifecycle status.
#[utoipa::path(
    patch,
    path = "/api/v1/containers/{code}/status",
    params(("code" = String, Path, description = "Container scan code")),
    request_body = ChangeStatusRequestBody,
    responses(
        (status = 200, description = "Container after the change", body = ContainerResponseBody),
        (status = 400, description = "Unknown status", body = ErrorSchema),
        (status = 404, description = "Unknown container", body = ErrorSchema),
        (status = 409, description = "Transition not allowed", body = ErrorSchema),
        (status = 503, description = "Temperature telemetry unavailable", body = ErrorSchema)
    ),
    tags = ["containers"],
    operation_id = "changeContainerStatus"
)]
#[patch("/containers/{code}/status")]
pub async fn change_status(
    state: web::Data<HttpState>,
    code: web::Path<String>,
    payload: web::Json<ChangeStatusRequestBody>,
) -> ApiResult<web::Json<ContainerResponseBody>> {
    let status = parse_status(&payload.status)?;
    let updated = state
        .containers
        .change_status(ChangeContainerStatusRequest {
            code: code.into_inner(),
            status,
        })
        .await?;
    Ok(web::Json(updated.into()))
}

/// Record that a container now sits in another fridge.
#[utoipa::path(
    patch,
    path = "/api/v1/containers/{code}/fridge",
    params(("code" = String, Path, description = "Container scan code")),
    request_body = ReassignFridgeRequestBody,
    responses(
        (status = 200, description = "Container after the move", body = ContainerResponseBody),
        (status = 400, description = "Invalid fridge", body = ErrorSchema),
        (status = 404, description = "Unknown container", body = ErrorSchema)
    ),
    tags = ["containers"],
    operation_id = "reassignFridge"
)]
#[patch("/containers/{code}/fridge")]
pub async fn reassign_fridge(
    state: web::Data<HttpState>,
    code: web::Path<String>,
    payload: web::Json<ReassignFridgeRequestBody>,
) -> ApiResult<web::Json<ContainerResponseBody>> {
    let fridge_id = require(payload.into_inner().fridge_id, FieldName::new("fridgeId"))?;
    let updated = state
        .containers
        .reassign_fridge(ReassignFridgeRequest {
            code: code.into_inner(),
            fridge_id,
        })
        .await?;
    Ok(web::Json(updated.into()))
}

#[cfg(test)]
#[path = "containers_tests.rs"]
mod tests;
