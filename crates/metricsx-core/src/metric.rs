//! Metric capability traits.
//!
//! Every operation takes label values positionally. Their count and order must
//! match the label names the metric was declared with; what happens on a
//! mismatch is up to the backend.

use std::fmt;
use std::time::Duration;

/// The four logical metric kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
    Summary,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
            MetricKind::Summary => "summary",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Monotonically increasing value per label tuple.
pub trait Counter: Send + Sync {
    /// Increment by 1.
    fn inc(&self, labels: &[&str]) {
        self.add(1.0, labels);
    }

    /// Increment by `value`. Negative values are rejected by the backend.
    fn add(&self, value: f64, labels: &[&str]);
}

/// Value that can go up and down.
pub trait Gauge: Send + Sync {
    fn set(&self, value: f64, labels: &[&str]);

    fn add(&self, value: f64, labels: &[&str]);

    fn sub(&self, value: f64, labels: &[&str]) {
        self.add(-value, labels);
    }

    fn inc(&self, labels: &[&str]) {
        self.add(1.0, labels);
    }

    fn dec(&self, labels: &[&str]) {
        self.sub(1.0, labels);
    }
}

/// Bucketed observations.
pub trait Histogram: Send + Sync {
    fn observe(&self, value: f64, labels: &[&str]);

    /// Start a timer that records into this histogram against `labels`.
    fn timer(&self, labels: &[&str]) -> Box<dyn Timer>;
}

/// Quantile observations over a sliding window.
pub trait Summary: Send + Sync {
    fn observe(&self, value: f64, labels: &[&str]);
}

/// Duration measurement bound to a histogram and a label tuple.
///
/// Call exactly one of [`Timer::stop`] or [`Timer::observe_duration`], once.
/// A second call measures again from the original start.
pub trait Timer: Send {
    /// Record the elapsed time (in seconds) and return it.
    fn stop(&self) -> Duration;

    /// Record the elapsed time (in seconds).
    fn observe_duration(&self) {
        let _ = self.stop();
    }
}
