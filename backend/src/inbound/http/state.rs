//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{ContainerCommand, ContainerQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub containers: Arc<dyn ContainerCommand>,
    pub containers_query: Arc<dyn ContainerQuery>,
}

impl HttpState {
    /// Construct state from the container command and query ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use viandas::domain::ContainerLifecycleService;
    /// use viandas::domain::ports::FixtureTemperatureOracle;
    /// use viandas::inbound::http::state::HttpState;
    /// use viandas::outbound::memory::InMemoryContainerRepository;
    ///
    /// let service = Arc::new(ContainerLifecycleService::new(
    ///     Arc::new(InMemoryContainerRepository::default()),
    ///     Arc::new(FixtureTemperatureOracle::default()),
    ///     Arc::new(mockable::DefaultClock),
    /// ));
    /// let _state = HttpState::new(service.clone(), service);
    /// ```
    pub fn new(
        containers: Arc<dyn ContainerCommand>,
        containers_query: Arc<dyn ContainerQuery>,
    ) -> Self {
        Self {
            containers,
            containers_query,
        }
    }
}
