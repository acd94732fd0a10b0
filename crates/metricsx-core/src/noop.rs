//! No-op backend.
//!
//! Every operation does nothing and every lifecycle call succeeds. Used when
//! metrics are disabled so call sites need no conditionals.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::context::Context;
use crate::error::Result;
use crate::metric::{Counter, Gauge, Histogram, Summary, Timer};
use crate::options::MetricOptions;
use crate::provider::Provider;

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProvider;

impl NoopProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Provider for NoopProvider {
    fn counter(&self, _name: &str, _opts: &MetricOptions) -> Result<Arc<dyn Counter>> {
        Ok(Arc::new(NoopMetric))
    }

    fn gauge(&self, _name: &str, _opts: &MetricOptions) -> Result<Arc<dyn Gauge>> {
        Ok(Arc::new(NoopMetric))
    }

    fn histogram(&self, _name: &str, _opts: &MetricOptions) -> Result<Arc<dyn Histogram>> {
        Ok(Arc::new(NoopMetric))
    }

    fn summary(&self, _name: &str, _opts: &MetricOptions) -> Result<Arc<dyn Summary>> {
        Ok(Arc::new(NoopMetric))
    }

    async fn start(&self, _ctx: &Context) -> Result<()> {
        Ok(())
    }

    async fn stop(&self, _ctx: &Context) -> Result<()> {
        Ok(())
    }
}

/// Stands in for every metric kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetric;

impl Counter for NoopMetric {
    fn inc(&self, _labels: &[&str]) {}
    fn add(&self, _value: f64, _labels: &[&str]) {}
}

impl Gauge for NoopMetric {
    fn set(&self, _value: f64, _labels: &[&str]) {}
    fn add(&self, _value: f64, _labels: &[&str]) {}
    fn sub(&self, _value: f64, _labels: &[&str]) {}
    fn inc(&self, _labels: &[&str]) {}
    fn dec(&self, _labels: &[&str]) {}
}

impl Histogram for NoopMetric {
    fn observe(&self, _value: f64, _labels: &[&str]) {}

    fn timer(&self, _labels: &[&str]) -> Box<dyn Timer> {
        Box::new(NoopTimer)
    }
}

impl Summary for NoopMetric {
    fn observe(&self, _value: f64, _labels: &[&str]) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTimer;

impl Timer for NoopTimer {
    fn stop(&self) -> Duration {
        Duration::ZERO
    }

    fn observe_duration(&self) {}
}
