//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod container_command;
mod container_query;
mod container_repository;
mod temperature_oracle;

#[cfg(test)]
pub use container_command::MockContainerCommand;
pub use container_command::{
    ChangeContainerStatusRequest, ContainerCommand, ContainerPayload, ExpirationOutcome,
    ReassignFridgeRequest, RegisterContainerRequest,
};
#[cfg(test)]
pub use container_query::MockContainerQuery;
pub use container_query::{CollaboratorMonthRequest, ContainerQuery};
#[cfg(test)]
pub use container_repository::MockContainerRepository;
pub use container_repository::{ContainerRepository, ContainerRepositoryError};
#[cfg(test)]
pub use temperature_oracle::MockTemperatureOracle;
pub use temperature_oracle::{
    FixtureTemperatureOracle, TemperatureOracle, TemperatureOracleError,
    UnconfiguredTemperatureOracle,
};
