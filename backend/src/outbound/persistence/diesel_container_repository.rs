//! PostgreSQL-backed `ContainerRepository` implementation using Diesel ORM.
//!
//! Rows are converted back through the validated domain constructors, so a
//! corrupted row surfaces as a query error instead of an invalid container.

use async_trait::async_trait;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ContainerRepository, ContainerRepositoryError};
use crate::domain::{
    CollaboratorId, Container, ContainerCode, ContainerStatus, FridgeId, PreparationPeriod,
    StatusTally,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{ContainerRow, ContainerUpdate, NewContainerRow};
use super::pool::{DbPool, PoolError};
use super::schema::containers;

/// Diesel-backed implementation of the container repository port.
#[derive(Clone)]
pub struct DieselContainerRepository {
    pool: DbPool,
}

impl DieselContainerRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ContainerRepositoryError {
    map_basic_pool_error(error, ContainerRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ContainerRepositoryError {
    map_basic_diesel_error(
        error,
        ContainerRepositoryError::query,
        ContainerRepositoryError::connection,
    )
}

fn parse_status(raw: &str) -> Result<ContainerStatus, ContainerRepositoryError> {
    raw.parse::<ContainerStatus>()
        .map_err(|err| ContainerRepositoryError::query(format!("stored status invalid: {err}")))
}

fn row_to_container(row: ContainerRow) -> Result<Container, ContainerRepositoryError> {
    let ContainerRow {
        code,
        collaborator_id,
        fridge_id,
        status,
        prepared_at,
    } = row;
    let invalid = |err: crate::domain::ContainerValidationError| {
        ContainerRepositoryError::query(format!("stored container invalid: {err}"))
    };

    Ok(Container::restore(
        ContainerCode::new(code).map_err(invalid)?,
        CollaboratorId::new(collaborator_id).map_err(invalid)?,
        FridgeId::new(fridge_id).map_err(invalid)?,
        parse_status(&status)?,
        prepared_at,
    ))
}

fn tally_rows(rows: Vec<(String, i64)>) -> Result<StatusTally, ContainerRepositoryError> {
    let mut tally = StatusTally::default();
    for (status, count) in rows {
        tally.set(parse_status(&status)?, count);
    }
    Ok(tally)
}

#[async_trait]
impl ContainerRepository for DieselContainerRepository {
    async fn find_by_code(
        &self,
        code: &ContainerCode,
    ) -> Result<Option<Container>, ContainerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = containers::table
            .filter(containers::code.eq(code.as_str()))
            .select(ContainerRow::as_select())
            .first::<ContainerRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_container).transpose()
    }

    async fn find_by_collaborator_and_period(
        &self,
        collaborator_id: CollaboratorId,
        period: &PreparationPeriod,
    ) -> Result<Vec<Container>, ContainerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = containers::table
            .filter(containers::collaborator_id.eq(collaborator_id.get()))
            .filter(containers::prepared_at.ge(period.start()))
            .filter(containers::prepared_at.lt(period.end()))
            .order((containers::prepared_at.asc(), containers::code.asc()))
            .select(ContainerRow::as_select())
            .load::<ContainerRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_container).collect()
    }

    async fn save(&self, container: &Container) -> Result<(), ContainerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_row = NewContainerRow {
            code: container.code().as_str(),
            collaborator_id: container.collaborator_id().get(),
            fridge_id: container.fridge_id().get(),
            status: container.status().as_str(),
            prepared_at: container.prepared_at(),
        };
        let update = ContainerUpdate {
            fridge_id: container.fridge_id().get(),
            status: container.status().as_str(),
        };

        diesel::insert_into(containers::table)
            .values(&new_row)
            .on_conflict(containers::code)
            .do_update()
            .set(&update)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), ContainerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(containers::table)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn count_by_status(&self) -> Result<StatusTally, ContainerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = containers::table
            .group_by(containers::status)
            .select((containers::status, count_star()))
            .load::<(String, i64)>(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        tally_rows(rows)
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion coverage; SQL paths need a live database.

    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    use super::*;

    fn row(status: &str) -> ContainerRow {
        ContainerRow {
            code: "QR1".to_owned(),
            collaborator_id: 7,
            fridge_id: 3,
            status: status.to_owned(),
            prepared_at: Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap(),
        }
    }

    #[rstest]
    fn valid_rows_become_containers() {
        let container = row_to_container(row("in_transit")).expect("valid row");
        assert_eq!(container.status(), ContainerStatus::InTransit);
        assert_eq!(container.fridge_id().get(), 3);
    }

    #[rstest]
    fn unknown_status_is_a_query_error() {
        let error = row_to_container(row("melted")).expect_err("invalid status");
        assert!(matches!(error, ContainerRepositoryError::Query { .. }));
    }

    #[rstest]
    fn corrupted_identifiers_are_query_errors() {
        let mut broken = row("prepared");
        broken.fridge_id = 0;
        let error = row_to_container(broken).expect_err("invalid fridge");
        assert!(error.to_string().contains("fridge id"));
    }

    #[rstest]
    fn grouped_counts_fill_the_tally() {
        let tally = tally_rows(vec![
            ("prepared".to_owned(), 4),
            ("expired".to_owned(), 2),
        ])
        .expect("valid rows");
        assert_eq!(
            tally,
            StatusTally {
                prepared: 4,
                in_transit: 0,
                expired: 2,
            }
        );
    }
}
