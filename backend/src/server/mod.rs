//! Server construction and middleware wiring.

mod config;
#[cfg(feature = "metrics")]
mod metrics;
mod state_builders;

pub use config::ServerConfig;
#[cfg(feature = "metrics")]
pub use metrics::make_metrics;

#[cfg(feature = "metrics")]
use metrics::{MetricsLayer, register_container_gauges};
use state_builders::{build_http_state, build_lifecycle_service};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use viandas::Trace;
#[cfg(debug_assertions)]
use viandas::doc::ApiDoc;
use viandas::inbound::http::configure_api;
use viandas::inbound::http::health::{HealthState, live, ready};
use viandas::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .configure(configure_api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and
/// configuration.
///
/// The lifecycle service is built and its counters hydrated before the
/// listener binds; readiness flips only after that succeeds.
///
/// # Errors
/// Propagates [`std::io::Error`] when adapter construction, counter
/// hydration, metric registration or binding the socket fails.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let service = build_lifecycle_service(&config).await?;
    #[cfg(feature = "metrics")]
    if let Some(prometheus) = &config.prometheus {
        register_container_gauges(prometheus, service.counter_handle())?;
    }
    let http_state = build_http_state(service);

    let ServerConfig {
        bind_addr,
        db_pool: _,
        oracle: _,
        #[cfg(feature = "metrics")]
        prometheus,
    } = config;

    #[cfg(feature = "metrics")]
    let metrics_layer = MetricsLayer::from_option(prometheus);

    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        let app = build_app(server_health_state.clone(), http_state.clone());

        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics_layer.clone());

        app
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
