//! Prometheus backend.

mod collectors;
mod metrics;
mod provider;
mod registry;
pub mod summary;
mod throttle;

pub use collectors::RuntimeCollector;
pub use metrics::{
    PrometheusCounter, PrometheusGauge, PrometheusHistogram, PrometheusSummary, PrometheusTimer,
};
pub use provider::PrometheusProvider;
pub use registry::PrometheusRegistry;
pub use summary::SummaryVec;
