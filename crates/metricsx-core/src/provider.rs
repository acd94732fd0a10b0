//! Backend abstraction.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::Context;
use crate::error::Result;
use crate::metric::{Counter, Gauge, Histogram, Summary};
use crate::options::MetricOptions;

/// Metric backend.
///
/// For a fixed provider, `(identity, kind) -> instance` is memoized: asking
/// twice for the same resolved identity and kind returns the same instance,
/// and options passed on later calls are ignored.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Create or retrieve a counter.
    fn counter(&self, name: &str, opts: &MetricOptions) -> Result<Arc<dyn Counter>>;

    /// Create or retrieve a gauge.
    fn gauge(&self, name: &str, opts: &MetricOptions) -> Result<Arc<dyn Gauge>>;

    /// Create or retrieve a histogram.
    fn histogram(&self, name: &str, opts: &MetricOptions) -> Result<Arc<dyn Histogram>>;

    /// Create or retrieve a summary.
    fn summary(&self, name: &str, opts: &MetricOptions) -> Result<Arc<dyn Summary>>;

    /// Start any exposition transport the provider owns. Returns once the
    /// listener is bound; serving continues in the background.
    async fn start(&self, ctx: &Context) -> Result<()>;

    /// Gracefully stop whatever `start` brought up, honoring the deadline.
    async fn stop(&self, ctx: &Context) -> Result<()>;

    /// Handler rendering current state for scraping, if the backend has one.
    fn exposition(&self) -> Option<Arc<dyn Exposition>> {
        None
    }
}

/// Renders a backend's current state in a pull-based text format.
pub trait Exposition: Send + Sync {
    fn content_type(&self) -> &'static str;

    fn render(&self) -> Result<String>;
}
