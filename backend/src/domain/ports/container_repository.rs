//! Port for container persistence.

use async_trait::async_trait;

use crate::domain::{CollaboratorId, Container, ContainerCode, PreparationPeriod, StatusTally};

use super::define_port_error;

define_port_error! {
    /// Errors raised by container repository adapters.
    pub enum ContainerRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "container repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "container repository query failed: {message}",
    }
}

/// Port for reading and writing containers keyed by scan code.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContainerRepository: Send + Sync {
    /// Find a container by its scan code.
    async fn find_by_code(
        &self,
        code: &ContainerCode,
    ) -> Result<Option<Container>, ContainerRepositoryError>;

    /// Containers of a collaborator prepared within `period`, ordered by
    /// preparation time then code.
    async fn find_by_collaborator_and_period(
        &self,
        collaborator_id: CollaboratorId,
        period: &PreparationPeriod,
    ) -> Result<Vec<Container>, ContainerRepositoryError>;

    /// Insert or update a container by code.
    async fn save(&self, container: &Container) -> Result<(), ContainerRepositoryError>;

    /// Remove every stored container.
    async fn clear_all(&self) -> Result<(), ContainerRepositoryError>;

    /// Count stored containers per status.
    async fn count_by_status(&self) -> Result<StatusTally, ContainerRepositoryError>;
}
