//! Driving port for container lifecycle mutations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Container, ContainerDraft, ContainerStatus, Error};

/// Serializable container payload for driving ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPayload {
    pub code: String,
    pub collaborator_id: i64,
    pub fridge_id: i64,
    pub status: ContainerStatus,
    pub prepared_at: DateTime<Utc>,
}

impl From<Container> for ContainerPayload {
    fn from(value: Container) -> Self {
        Self {
            collaborator_id: value.collaborator_id().get(),
            fridge_id: value.fridge_id().get(),
            status: value.status(),
            prepared_at: value.prepared_at(),
            code: value.code().to_string(),
        }
    }
}

/// Request to register a freshly prepared container.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterContainerRequest {
    pub draft: ContainerDraft,
}

/// Request to move a container to another lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeContainerStatusRequest {
    pub code: String,
    pub status: ContainerStatus,
}

/// Request to move a container into another fridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReassignFridgeRequest {
    pub code: String,
    pub fridge_id: i64,
}

/// Outcome of an expiration check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpirationOutcome {
    pub code: String,
    pub expired: bool,
}

/// Driving port for container write operations.
///
/// Errors use the domain [`Error`] taxonomy: `invalid_request` for malformed
/// input or duplicate codes, `not_found` for unknown codes,
/// `invalid_transition` for forbidden status moves and `oracle_unavailable`
/// when telemetry cannot be read.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContainerCommand: Send + Sync {
    /// Register a container. The stored status is always `prepared`.
    async fn register(&self, request: RegisterContainerRequest)
    -> Result<ContainerPayload, Error>;

    /// Change a container's status. Same-status requests are no-ops and a
    /// move to `expired` must be confirmed by fridge telemetry.
    async fn change_status(
        &self,
        request: ChangeContainerStatusRequest,
    ) -> Result<ContainerPayload, Error>;

    /// Record that a container now sits in another fridge.
    async fn reassign_fridge(
        &self,
        request: ReassignFridgeRequest,
    ) -> Result<ContainerPayload, Error>;

    /// Check fridge telemetry and expire the container when it confirms
    /// spoilage. The returned flag is `true` for containers that are, or just
    /// became, expired.
    async fn evaluate_expiration(&self, code: &str) -> Result<ExpirationOutcome, Error>;

    /// Delete every container and zero all counters.
    async fn reset_all(&self) -> Result<(), Error>;
}
