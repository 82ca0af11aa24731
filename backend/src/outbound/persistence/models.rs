//! Diesel row models for the `containers` table.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::containers;

/// Row read back from `containers`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = containers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ContainerRow {
    pub code: String,
    pub collaborator_id: i64,
    pub fridge_id: i64,
    pub status: String,
    pub prepared_at: DateTime<Utc>,
}

/// Row inserted for a new container.
#[derive(Debug, Insertable)]
#[diesel(table_name = containers)]
pub(crate) struct NewContainerRow<'a> {
    pub code: &'a str,
    pub collaborator_id: i64,
    pub fridge_id: i64,
    pub status: &'a str,
    pub prepared_at: DateTime<Utc>,
}

/// Mutable columns rewritten when a container already exists.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = containers)]
pub(crate) struct ContainerUpdate<'a> {
    pub fridge_id: i64,
    pub status: &'a str,
}
