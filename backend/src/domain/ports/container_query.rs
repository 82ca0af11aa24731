//! Driving port for container reads.

use async_trait::async_trait;

use crate::domain::{Error, StatusTally};

use super::ContainerPayload;

/// Request for a collaborator's containers prepared in one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollaboratorMonthRequest {
    pub collaborator_id: i64,
    pub month: u32,
    pub year: i32,
}

/// Driving port for container read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContainerQuery: Send + Sync {
    /// Look up a container by scan code.
    async fn find_by_code(&self, code: &str) -> Result<ContainerPayload, Error>;

    /// Containers a collaborator prepared in the requested month, ordered by
    /// preparation time then code. Empty when nothing matches.
    async fn containers_for_collaborator(
        &self,
        request: CollaboratorMonthRequest,
    ) -> Result<Vec<ContainerPayload>, Error>;

    /// Current per-status counters.
    async fn counters(&self) -> Result<StatusTally, Error>;
}
