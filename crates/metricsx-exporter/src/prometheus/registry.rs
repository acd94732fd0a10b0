//! Binds metric collectors into the shared `prometheus::Registry` and renders
//! it for scraping.

use prometheus::core::Collector;
use prometheus::{Encoder, Registry, TextEncoder};

use metricsx_core::error::{MetricsError, Result};
use metricsx_core::{Exposition, MetricKind};

use super::collectors::RuntimeCollector;
use crate::config::PrometheusConfig;

pub struct PrometheusRegistry {
    registry: Registry,
}

impl PrometheusRegistry {
    /// New registry with the default collectors the config asks for.
    pub fn new(cfg: &PrometheusConfig) -> Result<Self> {
        let this = Self {
            registry: Registry::new(),
        };

        if cfg.enable_process_metrics {
            this.register_process_collector()?;
        }
        if cfg.enable_runtime_metrics {
            let collector = RuntimeCollector::new()
                .map_err(|e| MetricsError::registration(MetricKind::Gauge, "tokio_runtime", e))?;
            this.register(MetricKind::Gauge, "tokio_runtime", Box::new(collector))?;
        }
        Ok(this)
    }

    #[cfg(target_os = "linux")]
    fn register_process_collector(&self) -> Result<()> {
        let pc = prometheus::process_collector::ProcessCollector::for_self();
        self.register(MetricKind::Gauge, "process", Box::new(pc))
    }

    #[cfg(not(target_os = "linux"))]
    fn register_process_collector(&self) -> Result<()> {
        tracing::warn!("process metrics are only available on linux; skipping");
        Ok(())
    }

    /// Registration failures mean a conflicting declaration and are never retried.
    pub fn register(&self, kind: MetricKind, name: &str, collector: Box<dyn Collector>) -> Result<()> {
        self.registry
            .register(collector)
            .map_err(|e| MetricsError::registration(kind, name, e))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Exposition for PrometheusRegistry {
    fn content_type(&self) -> &'static str {
        prometheus::TEXT_FORMAT
    }

    fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| MetricsError::Render(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| MetricsError::Render(e.to_string()))
    }
}
