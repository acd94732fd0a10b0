//! Provider selection and lifecycle wiring.
//!
//! Builds the configured provider plus the `Metrics` facade over it. Host
//! applications call `start`/`stop` from their own startup and shutdown path.

use std::sync::Arc;

use metricsx_core::error::Result;
use metricsx_core::noop::NoopProvider;
use metricsx_core::{Context, Exposition, Metrics, Provider};

use crate::config::MetricsConfig;
use crate::prometheus::PrometheusProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Prometheus,
    Noop,
}

impl ProviderKind {
    /// Unknown names fall back to `Noop` with a warning; disabled metrics always
    /// select `Noop`.
    pub fn from_config(cfg: &MetricsConfig) -> Self {
        if !cfg.enabled {
            tracing::info!("metrics disabled, using noop provider");
            return ProviderKind::Noop;
        }
        match cfg.provider.trim().to_ascii_lowercase().as_str() {
            "prometheus" => ProviderKind::Prometheus,
            "noop" => ProviderKind::Noop,
            _ => {
                tracing::warn!(provider = %cfg.provider, "unknown metrics provider, using noop");
                ProviderKind::Noop
            }
        }
    }
}

pub struct MetricsModule {
    kind: ProviderKind,
    provider: Arc<dyn Provider>,
    metrics: Metrics,
}

impl MetricsModule {
    pub fn new(cfg: &MetricsConfig) -> Result<Self> {
        let kind = ProviderKind::from_config(cfg);
        let provider: Arc<dyn Provider> = match kind {
            ProviderKind::Prometheus => Arc::new(PrometheusProvider::new(cfg.prometheus.clone())?),
            ProviderKind::Noop => Arc::new(NoopProvider::new()),
        };
        Ok(Self::with_provider(kind, provider))
    }

    pub fn with_provider(kind: ProviderKind, provider: Arc<dyn Provider>) -> Self {
        let metrics = Metrics::new(Arc::clone(&provider));
        Self {
            kind,
            provider,
            metrics,
        }
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn provider(&self) -> Arc<dyn Provider> {
        Arc::clone(&self.provider)
    }

    pub fn exposition(&self) -> Option<Arc<dyn Exposition>> {
        self.provider.exposition()
    }

    pub async fn start(&self, ctx: &Context) -> Result<()> {
        tracing::info!(provider = ?self.kind, "starting metrics provider");
        self.provider.start(ctx).await
    }

    pub async fn stop(&self, ctx: &Context) -> Result<()> {
        tracing::info!(provider = ?self.kind, "stopping metrics provider");
        self.provider.stop(ctx).await
    }
}
