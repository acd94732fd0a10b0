//! Prometheus-backed metric handles.
//!
//! Each handle wraps a labeled collector from the `prometheus` crate. Label
//! arity mismatches and negative counter increments are dropped with a
//! throttled warning instead of aborting the caller.

use std::fmt::Display;
use std::sync::Arc;
use std::time::{Duration, Instant};

use prometheus::core::Collector;
use prometheus::{CounterVec, GaugeVec, HistogramOpts, HistogramVec, Opts};

use metricsx_core::{
    Counter, Gauge, Histogram, MetricIdentity, MetricKind, MetricOptions, Objective, Summary, Timer,
};

use super::summary::SummaryVec;
use super::throttle::LogThrottle;

/// Declaration shared by every handle.
#[derive(Debug)]
pub(crate) struct Declared {
    kind: MetricKind,
    fq_name: String,
    help: String,
    label_names: Vec<String>,
    buckets: Vec<f64>,
    objectives: Vec<Objective>,
    throttle: LogThrottle,
}

impl Declared {
    fn new(kind: MetricKind, id: &MetricIdentity, opts: &MetricOptions) -> Self {
        Self {
            kind,
            fq_name: id.fq_name(),
            help: opts.help.clone(),
            label_names: opts.labels.clone(),
            buckets: opts.buckets.clone(),
            objectives: opts.objectives.clone(),
            throttle: LogThrottle::default(),
        }
    }

    pub(crate) fn fq_name(&self) -> &str {
        &self.fq_name
    }

    /// Options in `opts` that disagree with this declaration. Empty help and
    /// options the kind does not use are not compared.
    pub(crate) fn drift(&self, opts: &MetricOptions) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.label_names != opts.labels {
            fields.push("labels");
        }
        if !opts.help.is_empty() && self.help != opts.help {
            fields.push("help");
        }
        if self.kind == MetricKind::Histogram && self.buckets != opts.buckets {
            fields.push("buckets");
        }
        if self.kind == MetricKind::Summary && self.objectives != opts.objectives {
            fields.push("objectives");
        }
        fields
    }

    fn dropped(&self, reason: impl Display) {
        if let Some(suppressed) = self.throttle.should_emit() {
            tracing::warn!(
                metric = %self.fq_name,
                error = %reason,
                suppressed,
                "dropping observation"
            );
        }
    }
}

/// Handle the provider caches and registers.
pub(crate) trait Registered: Send + Sync {
    fn decl(&self) -> &Declared;

    fn collector(&self) -> Box<dyn Collector>;
}

macro_rules! impl_registered {
    ($($ty:ty),*) => {$(
        impl Registered for $ty {
            fn decl(&self) -> &Declared {
                &self.decl
            }

            fn collector(&self) -> Box<dyn Collector> {
                Box::new(self.vec.clone())
            }
        }
    )*};
}

impl_registered!(PrometheusCounter, PrometheusGauge, PrometheusHistogram, PrometheusSummary);

/// The registry rejects empty help text.
fn help_or_name(id: &MetricIdentity, opts: &MetricOptions) -> String {
    if opts.help.is_empty() {
        id.name.clone()
    } else {
        opts.help.clone()
    }
}

fn base_opts(id: &MetricIdentity, opts: &MetricOptions) -> Opts {
    Opts::new(id.name.clone(), help_or_name(id, opts))
        .namespace(id.namespace.clone())
        .subsystem(id.subsystem.clone())
}

fn label_refs(opts: &MetricOptions) -> Vec<&str> {
    opts.labels.iter().map(String::as_str).collect()
}

pub struct PrometheusCounter {
    decl: Declared,
    vec: CounterVec,
}

impl PrometheusCounter {
    pub(crate) fn new(id: &MetricIdentity, opts: &MetricOptions) -> prometheus::Result<Self> {
        let vec = CounterVec::new(base_opts(id, opts), &label_refs(opts))?;
        Ok(Self {
            decl: Declared::new(MetricKind::Counter, id, opts),
            vec,
        })
    }
}

impl Counter for PrometheusCounter {
    fn inc(&self, labels: &[&str]) {
        match self.vec.get_metric_with_label_values(labels) {
            Ok(c) => c.inc(),
            Err(e) => self.decl.dropped(e),
        }
    }

    fn add(&self, value: f64, labels: &[&str]) {
        if value.is_nan() || value < 0.0 {
            self.decl.dropped(format!("counter cannot add {value}"));
            return;
        }
        match self.vec.get_metric_with_label_values(labels) {
            Ok(c) => c.inc_by(value),
            Err(e) => self.decl.dropped(e),
        }
    }
}

pub struct PrometheusGauge {
    decl: Declared,
    vec: GaugeVec,
}

impl PrometheusGauge {
    pub(crate) fn new(id: &MetricIdentity, opts: &MetricOptions) -> prometheus::Result<Self> {
        let vec = GaugeVec::new(base_opts(id, opts), &label_refs(opts))?;
        Ok(Self {
            decl: Declared::new(MetricKind::Gauge, id, opts),
            vec,
        })
    }

    fn with(&self, labels: &[&str], f: impl FnOnce(prometheus::Gauge)) {
        match self.vec.get_metric_with_label_values(labels) {
            Ok(g) => f(g),
            Err(e) => self.decl.dropped(e),
        }
    }
}

impl Gauge for PrometheusGauge {
    fn set(&self, value: f64, labels: &[&str]) {
        self.with(labels, |g| g.set(value));
    }

    fn add(&self, value: f64, labels: &[&str]) {
        self.with(labels, |g| g.add(value));
    }

    fn sub(&self, value: f64, labels: &[&str]) {
        self.with(labels, |g| g.sub(value));
    }

    fn inc(&self, labels: &[&str]) {
        self.with(labels, |g| g.inc());
    }

    fn dec(&self, labels: &[&str]) {
        self.with(labels, |g| g.dec());
    }
}

pub struct PrometheusHistogram {
    decl: Arc<Declared>,
    vec: HistogramVec,
}

impl PrometheusHistogram {
    pub(crate) fn new(id: &MetricIdentity, opts: &MetricOptions) -> prometheus::Result<Self> {
        // HistogramVec only checks bounds when the first child is created.
        if opts.buckets.windows(2).any(|w| w[0] >= w[1]) {
            return Err(prometheus::Error::Msg(format!(
                "histogram buckets must be in increasing order: {:?}",
                opts.buckets
            )));
        }
        let hopts = HistogramOpts::from(base_opts(id, opts)).buckets(opts.buckets.clone());
        let vec = HistogramVec::new(hopts, &label_refs(opts))?;
        Ok(Self {
            decl: Arc::new(Declared::new(MetricKind::Histogram, id, opts)),
            vec,
        })
    }
}

fn observe_into(decl: &Declared, vec: &HistogramVec, value: f64, labels: &[&str]) {
    match vec.get_metric_with_label_values(labels) {
        Ok(h) => h.observe(value),
        Err(e) => decl.dropped(e),
    }
}

impl Histogram for PrometheusHistogram {
    fn observe(&self, value: f64, labels: &[&str]) {
        observe_into(&self.decl, &self.vec, value, labels);
    }

    fn timer(&self, labels: &[&str]) -> Box<dyn Timer> {
        Box::new(PrometheusTimer {
            decl: Arc::clone(&self.decl),
            vec: self.vec.clone(),
            labels: labels.iter().map(|s| s.to_string()).collect(),
            start: Instant::now(),
        })
    }
}

/// Shares state with its parent histogram through the cloned vec handle.
pub struct PrometheusTimer {
    decl: Arc<Declared>,
    vec: HistogramVec,
    labels: Vec<String>,
    start: Instant,
}

impl Timer for PrometheusTimer {
    fn stop(&self) -> Duration {
        let elapsed = self.start.elapsed();
        let labels: Vec<&str> = self.labels.iter().map(String::as_str).collect();
        observe_into(&self.decl, &self.vec, elapsed.as_secs_f64(), &labels);
        elapsed
    }
}

pub struct PrometheusSummary {
    decl: Declared,
    vec: SummaryVec,
}

impl PrometheusSummary {
    pub(crate) fn new(id: &MetricIdentity, opts: &MetricOptions) -> prometheus::Result<Self> {
        let vec = SummaryVec::new(base_opts(id, opts), &opts.labels, &opts.objectives)?;
        Ok(Self {
            decl: Declared::new(MetricKind::Summary, id, opts),
            vec,
        })
    }
}

impl Summary for PrometheusSummary {
    fn observe(&self, value: f64, labels: &[&str]) {
        if let Err(e) = self.vec.observe(value, labels) {
            self.decl.dropped(e);
        }
    }
}
