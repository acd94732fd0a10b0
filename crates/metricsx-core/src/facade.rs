//! Stable surface application code depends on.
//!
//! `Metrics` only resolves options and hands off to the active provider. It
//! keeps no cache; identity and reuse are the provider's job.

use std::sync::Arc;

use crate::error::Result;
use crate::metric::{Counter, Gauge, Histogram, Summary};
use crate::noop::NoopProvider;
use crate::options::MetricOptions;
use crate::provider::Provider;

#[derive(Clone)]
pub struct Metrics {
    provider: Arc<dyn Provider>,
}

impl Metrics {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self { provider }
    }

    /// Facade over the no-op backend.
    pub fn noop() -> Self {
        Self::new(Arc::new(NoopProvider::new()))
    }

    pub fn provider(&self) -> Arc<dyn Provider> {
        Arc::clone(&self.provider)
    }

    pub fn counter(&self, name: &str, opts: MetricOptions) -> Result<Arc<dyn Counter>> {
        self.provider.counter(name, &opts)
    }

    pub fn gauge(&self, name: &str, opts: MetricOptions) -> Result<Arc<dyn Gauge>> {
        self.provider.gauge(name, &opts)
    }

    pub fn histogram(&self, name: &str, opts: MetricOptions) -> Result<Arc<dyn Histogram>> {
        self.provider.histogram(name, &opts)
    }

    pub fn summary(&self, name: &str, opts: MetricOptions) -> Result<Arc<dyn Summary>> {
        self.provider.summary(name, &opts)
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish_non_exhaustive()
    }
}
