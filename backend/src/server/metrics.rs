//! Prometheus wiring: HTTP middleware plus the container gauges.

use std::sync::Arc;

use actix_service::{
    Service, ServiceExt as _, Transform,
    boxed::{self, BoxService},
};
use actix_web::body::BoxBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Compat;
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use futures_util::future::LocalBoxFuture;
#[cfg(target_os = "linux")]
use prometheus::process_collector::ProcessCollector;
use tracing::info;

use viandas::domain::ContainerCounters;
use viandas::outbound::metrics::PrometheusContainerGauges;

/// Build the `/metrics` middleware with the `viandas` namespace.
///
/// # Errors
/// Returns [`std::io::Error`] if the default HTTP metrics cannot be created.
pub fn make_metrics() -> std::io::Result<PrometheusMetrics> {
    PrometheusMetricsBuilder::new("viandas")
        .endpoint("/metrics")
        .build()
        .map_err(|err| std::io::Error::other(format!("prometheus setup failed: {err}")))
}

/// Register the container gauges alongside the HTTP metrics so both are
/// served from the same scrape endpoint. On Linux the process collector
/// (CPU, memory, open file descriptors) joins them.
pub(crate) fn register_container_gauges(
    prometheus: &PrometheusMetrics,
    counters: Arc<ContainerCounters>,
) -> std::io::Result<()> {
    PrometheusContainerGauges::register(counters, &prometheus.registry).map_err(|err| {
        std::io::Error::other(format!("container gauge registration failed: {err}"))
    })?;
    #[cfg(target_os = "linux")]
    prometheus
        .registry
        .register(Box::new(ProcessCollector::for_self()))
        .map_err(|err| {
            std::io::Error::other(format!("process collector registration failed: {err}"))
        })?;
    info!("container gauges registered");
    Ok(())
}

/// Wraps the app in Prometheus middleware when metrics are configured, or
/// passes requests straight through otherwise. Both arms box the service so
/// `App::wrap` sees a single type.
#[derive(Clone)]
pub(crate) enum MetricsLayer {
    Enabled(Arc<PrometheusMetrics>),
    Disabled,
}

impl MetricsLayer {
    #[must_use]
    pub(crate) fn from_option(metrics: Option<PrometheusMetrics>) -> Self {
        metrics.map_or(Self::Disabled, |metrics| Self::Enabled(Arc::new(metrics)))
    }
}

impl<S, B> Transform<S, ServiceRequest> for MetricsLayer
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = BoxService<ServiceRequest, ServiceResponse<BoxBody>, actix_web::Error>;
    type Future = LocalBoxFuture<'static, Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        match self.clone() {
            MetricsLayer::Enabled(metrics) => {
                let fut = Compat::new((*metrics).clone()).new_transform(service);
                Box::pin(async move { Ok(boxed::service(fut.await?)) })
            }
            MetricsLayer::Disabled => Box::pin(async move {
                let svc = service.map(|res: ServiceResponse<B>| res.map_into_boxed_body());
                Ok(boxed::service(svc))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    use super::*;

    #[actix_web::test]
    async fn scrape_endpoint_exposes_container_gauges() {
        let prometheus = make_metrics().expect("metrics build");
        let counters = Arc::new(ContainerCounters::new());
        register_container_gauges(&prometheus, Arc::clone(&counters)).expect("gauges register");

        let app = test::init_service(
            App::new()
                .wrap(MetricsLayer::from_option(Some(prometheus)))
                .route("/", web::get().to(HttpResponse::Ok)),
        )
        .await;
        let res =
            test::call_service(&app, test::TestRequest::get().uri("/metrics").to_request()).await;

        assert_eq!(res.status(), StatusCode::OK);
        let body = test::read_body(res).await;
        let text = std::str::from_utf8(&body).expect("utf8 metrics");
        assert!(text.contains("containers_prepared 0"));
        assert!(text.contains("containers_in_transit 0"));
        assert!(text.contains("containers_expired 0"));
        #[cfg(target_os = "linux")]
        assert!(text.contains("process_open_fds"));
    }

    #[actix_web::test]
    async fn disabled_layer_passes_requests_through() {
        let app = test::init_service(
            App::new()
                .wrap(MetricsLayer::from_option(None))
                .route("/", web::get().to(HttpResponse::Ok)),
        )
        .await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

        assert_eq!(res.status(), StatusCode::OK);
    }
}
