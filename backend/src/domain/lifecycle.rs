//! Container lifecycle service.
//!
//! Implements the container driving ports on top of a
//! [`ContainerRepository`] and a [`TemperatureOracle`]. The service owns the
//! aggregate [`ContainerCounters`]; every commit that changes how many
//! containers sit in a status runs under one async lock, re-reads the stored
//! container and adjusts the counters once per stored change.
//!
//! Oracle queries run outside the lock. A confirmed expiry only counts when
//! the re-read inside the lock shows the container was not already expired
//! and still sits in the fridge whose readings confirmed it.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    ChangeContainerStatusRequest, CollaboratorMonthRequest, ContainerCommand, ContainerPayload,
    ContainerQuery, ContainerRepository, ContainerRepositoryError, ExpirationOutcome,
    ReassignFridgeRequest, RegisterContainerRequest, TemperatureOracle, TemperatureOracleError,
};
use crate::domain::{
    CollaboratorId, Container, ContainerCode, ContainerCounters, ContainerStatus,
    ContainerValidationError, Error, FridgeId, PreparationPeriod, StatusTally,
    readings_confirm_expiry,
};

fn map_repository_error(error: ContainerRepositoryError) -> Error {
    match error {
        ContainerRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("container repository unavailable: {message}"))
        }
        ContainerRepositoryError::Query { message } => {
            Error::internal(format!("container repository error: {message}"))
        }
    }
}

fn map_oracle_error(error: TemperatureOracleError) -> Error {
    Error::oracle_unavailable(format!("unable to read fridge temperatures: {error}"))
}

fn map_validation_error(field: &str, error: ContainerValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({ "field": field }))
}

fn parse_code(raw: &str) -> Result<ContainerCode, Error> {
    ContainerCode::new(raw).map_err(|err| map_validation_error("code", err))
}

/// Outcome of committing a confirmed expiry.
enum ExpiryCommit {
    Expired(Container),
    Moved(Container),
}

fn rejected_transition(code: &ContainerCode, from: ContainerStatus, to: ContainerStatus) -> Error {
    let message = if from.is_terminal() {
        format!("container {code} is {from} and can no longer change status")
    } else {
        format!("container {code} cannot move from {from} to {to}")
    };
    Error::invalid_transition(message).with_details(json!({
        "code": code.as_str(),
        "from": from.as_str(),
        "to": to.as_str(),
    }))
}

/// Lifecycle service implementing [`ContainerCommand`] and [`ContainerQuery`].
///
/// One instance must back both ports so they share counters and the commit
/// lock.
pub struct ContainerLifecycleService<R: ?Sized, O: ?Sized> {
    container_repo: Arc<R>,
    oracle: Arc<O>,
    clock: Arc<dyn Clock>,
    counters: Arc<ContainerCounters>,
    commit_lock: Mutex<()>,
}

impl<R, O> ContainerLifecycleService<R, O>
where
    R: ContainerRepository + ?Sized,
    O: TemperatureOracle + ?Sized,
{
    /// Create a service with zeroed counters. Call
    /// [`hydrate_counters`](Self::hydrate_counters) when the repository may
    /// already hold containers.
    pub fn new(container_repo: Arc<R>, oracle: Arc<O>, clock: Arc<dyn Clock>) -> Self {
        Self {
            container_repo,
            oracle,
            clock,
            counters: Arc::new(ContainerCounters::new()),
            commit_lock: Mutex::new(()),
        }
    }

    /// Shared handle to the live counters, for read-only consumers such as
    /// metrics collectors.
    pub fn counter_handle(&self) -> Arc<ContainerCounters> {
        Arc::clone(&self.counters)
    }

    /// Recompute counters from the repository.
    pub async fn hydrate_counters(&self) -> Result<StatusTally, Error> {
        let _guard = self.commit_lock.lock().await;
        let tally = self
            .container_repo
            .count_by_status()
            .await
            .map_err(map_repository_error)?;
        self.counters.restore(tally);
        info!(
            prepared = tally.prepared,
            in_transit = tally.in_transit,
            expired = tally.expired,
            "container counters hydrated"
        );
        Ok(tally)
    }

    async fn load(&self, code: &ContainerCode) -> Result<Container, Error> {
        self.container_repo
            .find_by_code(code)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("container {code} not found")))
    }

    async fn persist(&self, container: &Container) -> Result<(), Error> {
        self.container_repo
            .save(container)
            .await
            .map_err(map_repository_error)
    }

    /// Apply `next` to the stored container under the commit lock.
    async fn commit_transition(
        &self,
        code: &ContainerCode,
        next: ContainerStatus,
    ) -> Result<Container, Error> {
        let _guard = self.commit_lock.lock().await;
        let current = self.load(code).await?;
        self.apply_transition(current, next).await
    }

    /// Persist `next` for `current` and move the counters. Callers hold the
    /// commit lock and pass the container as re-read inside it.
    ///
    /// The stored status decides the outcome: an identical status is a no-op
    /// and anything outside the transition table is rejected.
    async fn apply_transition(
        &self,
        current: Container,
        next: ContainerStatus,
    ) -> Result<Container, Error> {
        let from = current.status();
        if from == next {
            return Ok(current);
        }
        if !from.permits(next) {
            return Err(rejected_transition(current.code(), from, next));
        }

        let updated = current.with_status(next);
        self.persist(&updated).await?;
        self.counters.record_transition(from, next);
        info!(code = %updated.code(), from = %from, to = %next, "container status changed");
        Ok(updated)
    }

    /// Commit an expiry confirmed by `fridge_id`'s readings.
    ///
    /// The readings only count for the fridge they came from: if the container
    /// was moved while the oracle was queried, the stored container is handed
    /// back for another evaluation.
    async fn commit_expiry(
        &self,
        code: &ContainerCode,
        fridge_id: FridgeId,
    ) -> Result<ExpiryCommit, Error> {
        let _guard = self.commit_lock.lock().await;
        let current = self.load(code).await?;
        if !current.status().is_terminal() && current.fridge_id() != fridge_id {
            return Ok(ExpiryCommit::Moved(current));
        }
        self.apply_transition(current, ContainerStatus::Expired)
            .await
            .map(ExpiryCommit::Expired)
    }

    /// Expire `container` when its fridge telemetry confirms spoilage.
    ///
    /// Returns the expired container, or `None` when telemetry shows no
    /// breach. Containers already expired short-circuit without a query.
    async fn expire_if_confirmed(&self, container: &Container) -> Result<Option<Container>, Error> {
        let mut container = container.clone();
        loop {
            if container.status().is_terminal() {
                return Ok(Some(container));
            }

            let fridge_id = container.fridge_id();
            let readings = self
                .oracle
                .temperatures_for(fridge_id)
                .await
                .map_err(|err| {
                    warn!(code = %container.code(), fridge_id = %fridge_id, error = %err, "temperature oracle failed");
                    map_oracle_error(err)
                })?;

            if !readings_confirm_expiry(&readings) {
                debug!(
                    code = %container.code(),
                    fridge_id = %fridge_id,
                    readings = readings.len(),
                    "no temperature breach recorded"
                );
                return Ok(None);
            }

            match self.commit_expiry(container.code(), fridge_id).await? {
                ExpiryCommit::Expired(expired) => return Ok(Some(expired)),
                ExpiryCommit::Moved(moved) => {
                    debug!(
                        code = %moved.code(),
                        from = %fridge_id,
                        to = %moved.fridge_id(),
                        "container moved during evaluation; re-reading telemetry"
                    );
                    container = moved;
                }
            }
        }
    }
}

#[async_trait]
impl<R, O> ContainerCommand for ContainerLifecycleService<R, O>
where
    R: ContainerRepository + ?Sized,
    O: TemperatureOracle + ?Sized,
{
    async fn register(
        &self,
        request: RegisterContainerRequest,
    ) -> Result<ContainerPayload, Error> {
        let container = Container::prepare(request.draft, self.clock.utc()).map_err(|err| {
            let field = match err {
                ContainerValidationError::InvalidCollaboratorId { .. } => "collaboratorId",
                ContainerValidationError::InvalidFridgeId { .. } => "fridgeId",
                _ => "code",
            };
            map_validation_error(field, err)
        })?;

        let _guard = self.commit_lock.lock().await;
        let existing = self
            .container_repo
            .find_by_code(container.code())
            .await
            .map_err(map_repository_error)?;
        if existing.is_some() {
            return Err(Error::invalid_request(format!(
                "container {} is already registered",
                container.code()
            ))
            .with_details(json!({ "field": "code", "code": "duplicate_code" })));
        }

        self.persist(&container).await?;
        self.counters.record_registration();
        info!(
            code = %container.code(),
            collaborator_id = %container.collaborator_id(),
            fridge_id = %container.fridge_id(),
            "container registered"
        );
        Ok(container.into())
    }

    async fn change_status(
        &self,
        request: ChangeContainerStatusRequest,
    ) -> Result<ContainerPayload, Error> {
        let code = parse_code(&request.code)?;
        let container = self.load(&code).await?;
        let current = container.status();

        if request.status == current {
            return Ok(container.into());
        }
        if current.is_terminal() {
            return Err(rejected_transition(&code, current, request.status));
        }
        if request.status != ContainerStatus::Expired {
            return self
                .commit_transition(&code, request.status)
                .await
                .map(Into::into);
        }

        match self.expire_if_confirmed(&container).await? {
            Some(expired) => Ok(expired.into()),
            None => Err(Error::invalid_transition(format!(
                "container {code} cannot expire: no temperature breach recorded for fridge {}",
                container.fridge_id()
            ))
            .with_details(json!({
                "code": code.as_str(),
                "from": current.as_str(),
                "to": ContainerStatus::Expired.as_str(),
            }))),
        }
    }

    async fn reassign_fridge(
        &self,
        request: ReassignFridgeRequest,
    ) -> Result<ContainerPayload, Error> {
        let code = parse_code(&request.code)?;
        let fridge_id = FridgeId::new(request.fridge_id)
            .map_err(|err| map_validation_error("fridgeId", err))?;

        // Saves write the whole record, so hold the lock to avoid clobbering a
        // concurrent status commit.
        let _guard = self.commit_lock.lock().await;
        let container = self.load(&code).await?;
        let previous = container.fridge_id();
        let updated = container.with_fridge(fridge_id);
        self.persist(&updated).await?;
        info!(code = %code, from = %previous, to = %fridge_id, "container moved to another fridge");
        Ok(updated.into())
    }

    async fn evaluate_expiration(&self, code: &str) -> Result<ExpirationOutcome, Error> {
        let code = parse_code(code)?;
        let container = self.load(&code).await?;
        let expired = self.expire_if_confirmed(&container).await?.is_some();
        Ok(ExpirationOutcome {
            code: code.into(),
            expired,
        })
    }

    async fn reset_all(&self) -> Result<(), Error> {
        let _guard = self.commit_lock.lock().await;
        self.container_repo
            .clear_all()
            .await
            .map_err(map_repository_error)?;
        self.counters.reset();
        warn!("all containers removed and counters reset");
        Ok(())
    }
}

#[async_trait]
impl<R, O> ContainerQuery for ContainerLifecycleService<R, O>
where
    R: ContainerRepository + ?Sized,
    O: TemperatureOracle + ?Sized,
{
    async fn find_by_code(&self, code: &str) -> Result<ContainerPayload, Error> {
        let code = parse_code(code)?;
        self.load(&code).await.map(Into::into)
    }

    async fn containers_for_collaborator(
        &self,
        request: CollaboratorMonthRequest,
    ) -> Result<Vec<ContainerPayload>, Error> {
        let collaborator_id = CollaboratorId::new(request.collaborator_id)
            .map_err(|err| map_validation_error("collaboratorId", err))?;
        let period = PreparationPeriod::new(request.month, request.year).map_err(|err| {
            let field = match err {
                ContainerValidationError::InvalidMonth { .. } => "month",
                _ => "year",
            };
            map_validation_error(field, err)
        })?;

        let containers = self
            .container_repo
            .find_by_collaborator_and_period(collaborator_id, &period)
            .await
            .map_err(map_repository_error)?;
        Ok(containers.into_iter().map(Into::into).collect())
    }

    async fn counters(&self) -> Result<StatusTally, Error> {
        // Under the lock no commit sits between its store write and its
        // counter update.
        let _guard = self.commit_lock.lock().await;
        Ok(self.counters.snapshot())
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
