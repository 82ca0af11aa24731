//! In-process container store.
//!
//! Used when no database URL is configured and by integration tests. State
//! lives only as long as the process.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::domain::ports::{ContainerRepository, ContainerRepositoryError};
use crate::domain::{CollaboratorId, Container, ContainerCode, PreparationPeriod, StatusTally};

/// `ContainerRepository` keeping containers in a map keyed by code.
#[derive(Debug, Default)]
pub struct InMemoryContainerRepository {
    containers: RwLock<BTreeMap<ContainerCode, Container>>,
}

impl InMemoryContainerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(
        &self,
    ) -> Result<RwLockReadGuard<'_, BTreeMap<ContainerCode, Container>>, ContainerRepositoryError>
    {
        self.containers
            .read()
            .map_err(|_| ContainerRepositoryError::connection("in-memory store lock poisoned"))
    }

    fn write(
        &self,
    ) -> Result<RwLockWriteGuard<'_, BTreeMap<ContainerCode, Container>>, ContainerRepositoryError>
    {
        self.containers
            .write()
            .map_err(|_| ContainerRepositoryError::connection("in-memory store lock poisoned"))
    }
}

#[async_trait]
impl ContainerRepository for InMemoryContainerRepository {
    async fn find_by_code(
        &self,
        code: &ContainerCode,
    ) -> Result<Option<Container>, ContainerRepositoryError> {
        Ok(self.read()?.get(code).cloned())
    }

    async fn find_by_collaborator_and_period(
        &self,
        collaborator_id: CollaboratorId,
        period: &PreparationPeriod,
    ) -> Result<Vec<Container>, ContainerRepositoryError> {
        let mut matches: Vec<Container> = self
            .read()?
            .values()
            .filter(|container| {
                container.collaborator_id() == collaborator_id
                    && period.contains(container.prepared_at())
            })
            .cloned()
            .collect();
        matches.sort_by(|left, right| {
            left.prepared_at()
                .cmp(&right.prepared_at())
                .then_with(|| left.code().cmp(right.code()))
        });
        Ok(matches)
    }

    async fn save(&self, container: &Container) -> Result<(), ContainerRepositoryError> {
        self.write()?
            .insert(container.code().clone(), container.clone());
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), ContainerRepositoryError> {
        self.write()?.clear();
        Ok(())
    }

    async fn count_by_status(&self) -> Result<StatusTally, ContainerRepositoryError> {
        Ok(StatusTally::from_statuses(
            self.read()?.values().map(Container::status),
        ))
    }
}
