//! Prometheus collector exposing the container lifecycle counters.
//!
//! Gauges are refreshed from the live counters on every scrape, so the
//! exported values never lag behind the lifecycle service.
//!
//! # Metric Specification
//!
//! - `containers_prepared`: containers currently prepared
//! - `containers_in_transit`: containers currently in transit
//! - `containers_expired`: containers currently expired

use std::sync::Arc;

use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{IntGauge, Registry};

use crate::domain::{ContainerCounters, ContainerStatus};

/// Pull-model collector over [`ContainerCounters`].
pub struct PrometheusContainerGauges {
    counters: Arc<ContainerCounters>,
    prepared: IntGauge,
    in_transit: IntGauge,
    expired: IntGauge,
}

impl PrometheusContainerGauges {
    /// Create the collector and register it with `registry`.
    ///
    /// # Errors
    ///
    /// Returns an error if a metric with the same name is already registered.
    pub fn register(
        counters: Arc<ContainerCounters>,
        registry: &Registry,
    ) -> Result<(), prometheus::Error> {
        registry.register(Box::new(Self::new(counters)?))
    }

    fn new(counters: Arc<ContainerCounters>) -> Result<Self, prometheus::Error> {
        Ok(Self {
            counters,
            prepared: IntGauge::new("containers_prepared", "Containers currently prepared")?,
            in_transit: IntGauge::new("containers_in_transit", "Containers currently in transit")?,
            expired: IntGauge::new("containers_expired", "Containers currently expired")?,
        })
    }

    fn gauge(&self, status: ContainerStatus) -> &IntGauge {
        match status {
            ContainerStatus::Prepared => &self.prepared,
            ContainerStatus::InTransit => &self.in_transit,
            ContainerStatus::Expired => &self.expired,
        }
    }
}

impl Collector for PrometheusContainerGauges {
    fn desc(&self) -> Vec<&Desc> {
        ContainerStatus::ALL
            .into_iter()
            .flat_map(|status| self.gauge(status).desc())
            .collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let snapshot = self.counters.snapshot();
        ContainerStatus::ALL
            .into_iter()
            .flat_map(|status| {
                let gauge = self.gauge(status);
                gauge.set(snapshot.count(status));
                gauge.collect()
            })
            .collect()
    }
}
