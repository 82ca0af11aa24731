//! Builders selecting adapters for the lifecycle service from configuration.

use std::sync::Arc;

use actix_web::web;
use tracing::{info, warn};

use viandas::domain::ContainerLifecycleService;
use viandas::domain::ports::{
    ContainerRepository, TemperatureOracle, UnconfiguredTemperatureOracle,
};
use viandas::inbound::http::state::HttpState;
use viandas::outbound::fridges::HttpTemperatureOracle;
use viandas::outbound::memory::InMemoryContainerRepository;
use viandas::outbound::persistence::DieselContainerRepository;

use super::ServerConfig;

/// Lifecycle service over type-erased adapters.
pub(crate) type LifecycleService =
    ContainerLifecycleService<dyn ContainerRepository, dyn TemperatureOracle>;

fn build_repository(config: &ServerConfig) -> Arc<dyn ContainerRepository> {
    match &config.db_pool {
        Some(pool) => Arc::new(DieselContainerRepository::new(pool.clone())),
        None => {
            warn!("no database configured; containers are kept in memory");
            Arc::new(InMemoryContainerRepository::new())
        }
    }
}

fn build_oracle(config: &ServerConfig) -> std::io::Result<Arc<dyn TemperatureOracle>> {
    match &config.oracle {
        Some(endpoint) => {
            let oracle = HttpTemperatureOracle::new(endpoint.base_url.clone(), endpoint.timeout)
                .map_err(|err| {
                    std::io::Error::other(format!("telemetry client construction failed: {err}"))
                })?;
            info!(base_url = %endpoint.base_url, "fridge telemetry configured");
            Ok(Arc::new(oracle))
        }
        None => {
            warn!("no fridge telemetry configured; expiry evaluation will be unavailable");
            Ok(Arc::new(UnconfiguredTemperatureOracle))
        }
    }
}

/// Build the lifecycle service and bring its counters in line with storage.
///
/// # Errors
/// Returns [`std::io::Error`] when the telemetry client cannot be built or
/// the repository cannot be counted.
pub(crate) async fn build_lifecycle_service(
    config: &ServerConfig,
) -> std::io::Result<Arc<LifecycleService>> {
    let service = Arc::new(LifecycleService::new(
        build_repository(config),
        build_oracle(config)?,
        Arc::new(mockable::DefaultClock),
    ));
    service
        .hydrate_counters()
        .await
        .map_err(|err| std::io::Error::other(format!("counter hydration failed: {err}")))?;
    Ok(service)
}

/// Expose one service instance through both HTTP-facing ports.
pub(crate) fn build_http_state(service: Arc<LifecycleService>) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(service.clone(), service))
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::time::Duration;

    use rstest::rstest;
    use viandas::domain::ErrorCode;
    use viandas::domain::ports::{ContainerCommand, ContainerQuery, RegisterContainerRequest};

    use super::*;

    fn config() -> ServerConfig {
        ServerConfig::new(SocketAddr::from(([127, 0, 0, 1], 0)))
    }

    #[rstest]
    #[tokio::test]
    async fn memory_service_starts_with_zero_counters() {
        let service = build_lifecycle_service(&config())
            .await
            .expect("service builds");

        let tally = service.counters().await.expect("counters");
        assert_eq!(tally.total(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_oracle_reports_unavailable() {
        let service = build_lifecycle_service(&config())
            .await
            .expect("service builds");
        service
            .register(RegisterContainerRequest {
                draft: viandas::domain::ContainerDraft {
                    code: "QR1".to_owned(),
                    collaborator_id: 1,
                    fridge_id: 2,
                    prepared_at: None,
                },
            })
            .await
            .expect("registered");

        let err = service
            .evaluate_expiration("QR1")
            .await
            .expect_err("no oracle configured");
        assert_eq!(err.code(), ErrorCode::OracleUnavailable);
    }

    #[rstest]
    #[tokio::test]
    async fn configured_oracle_builds() {
        let url = reqwest::Url::parse("http://telemetry.local/").expect("valid url");
        let config = config().with_oracle(url, Duration::from_millis(100));

        assert!(build_lifecycle_service(&config).await.is_ok());
    }
}
