//! Domain primitives, services and ports.
//!
//! Purpose: model meal containers and their lifecycle independently of HTTP,
//! storage or telemetry transports. Inbound adapters call the driving ports
//! in [`ports`]; outbound adapters implement its driven ports.
//!
//! Public surface:
//! - Container (alias to `container::Container`) and its validated fields.
//! - ContainerLifecycleService (alias to `lifecycle::ContainerLifecycleService`)
//!   implementing the container command and query ports.
//! - Error (alias to `error::Error`) and ErrorCode.
//! - TraceId (alias to `trace_id::TraceId`) for request correlation.

pub mod container;
pub mod counters;
pub mod error;
pub mod lifecycle;
pub mod ports;
pub mod temperature;
pub mod trace_id;

pub use self::container::{
    CONTAINER_CODE_MAX, CollaboratorId, Container, ContainerCode, ContainerDraft,
    ContainerStatus, ContainerValidationError, FridgeId, PreparationPeriod,
    RESERVED_CONTAINER_CODES,
};
pub use self::counters::{ContainerCounters, StatusTally};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::lifecycle::ContainerLifecycleService;
pub use self::temperature::{
    EXPIRY_THRESHOLD_CELSIUS, TemperatureReading, readings_confirm_expiry,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
