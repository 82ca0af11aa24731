//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! The container repository is backed by PostgreSQL through `diesel-async`
//! and a `bb8` pool. Row structs (`models.rs`) and the table definition
//! (`schema.rs`) stay internal; only validated domain containers cross the
//! port.
//!
//! # Example
//!
//! ```no_run
//! use viandas::outbound::persistence::{DbPool, DieselContainerRepository, PoolConfig};
//!
//! # async fn build() -> Result<(), viandas::outbound::persistence::PoolError> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/viandas")).await?;
//! let repo = DieselContainerRepository::new(pool);
//! # let _ = repo;
//! # Ok(())
//! # }
//! ```

mod diesel_basic_error_mapping;
mod diesel_container_repository;
mod models;
mod pool;
mod schema;

pub use diesel_container_repository::DieselContainerRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
