//! Metric option set and identity.
//!
//! Options are a plain value built from defaults, then overridden either
//! through builder methods or by applying a list of [`MetricOption`]
//! modifiers in order (later modifiers win).

/// Default histogram bucket upper bounds, in seconds.
pub const DEFAULT_BUCKETS: [f64; 9] = [0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0];

/// Default summary objectives.
pub const DEFAULT_OBJECTIVES: [Objective; 3] = [
    Objective::new(0.5, 0.05),
    Objective::new(0.9, 0.01),
    Objective::new(0.99, 0.001),
];

/// Target quantile and the rank error tolerated when estimating it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Objective {
    pub quantile: f64,
    pub error: f64,
}

impl Objective {
    pub const fn new(quantile: f64, error: f64) -> Self {
        Self { quantile, error }
    }
}

/// Single-field modifier applied to a [`MetricOptions`].
#[derive(Debug, Clone, PartialEq)]
pub enum MetricOption {
    Help(String),
    Labels(Vec<String>),
    Buckets(Vec<f64>),
    Objectives(Vec<Objective>),
    Namespace(String),
    Subsystem(String),
}

impl MetricOption {
    pub fn apply(self, opts: &mut MetricOptions) {
        match self {
            MetricOption::Help(v) => opts.help = v,
            MetricOption::Labels(v) => opts.labels = v,
            MetricOption::Buckets(v) => opts.buckets = v,
            MetricOption::Objectives(v) => opts.objectives = v,
            MetricOption::Namespace(v) => opts.namespace = v,
            MetricOption::Subsystem(v) => opts.subsystem = v,
        }
    }
}

/// Resolved configuration of one metric declaration.
///
/// No validation happens here; bad label names or unsorted buckets surface
/// when the provider registers the metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricOptions {
    pub help: String,
    pub labels: Vec<String>,
    pub buckets: Vec<f64>,
    pub objectives: Vec<Objective>,
    pub namespace: String,
    pub subsystem: String,
}

impl Default for MetricOptions {
    fn default() -> Self {
        Self {
            help: String::new(),
            labels: Vec::new(),
            buckets: DEFAULT_BUCKETS.to_vec(),
            objectives: DEFAULT_OBJECTIVES.to_vec(),
            namespace: String::new(),
            subsystem: String::new(),
        }
    }
}

impl MetricOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `modifiers` to the defaults in iteration order.
    pub fn resolve<I>(modifiers: I) -> Self
    where
        I: IntoIterator<Item = MetricOption>,
    {
        let mut opts = Self::default();
        for m in modifiers {
            m.apply(&mut opts);
        }
        opts
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn buckets(mut self, buckets: impl Into<Vec<f64>>) -> Self {
        self.buckets = buckets.into();
        self
    }

    pub fn objectives(mut self, objectives: impl Into<Vec<Objective>>) -> Self {
        self.objectives = objectives.into();
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn subsystem(mut self, subsystem: impl Into<String>) -> Self {
        self.subsystem = subsystem.into();
        self
    }
}

/// `(namespace, subsystem, name)` key addressing one metric within a provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetricIdentity {
    pub namespace: String,
    pub subsystem: String,
    pub name: String,
}

impl MetricIdentity {
    /// Per-metric overrides win when non-empty, else the provider defaults apply.
    pub fn resolve(
        name: &str,
        opts: &MetricOptions,
        default_namespace: &str,
        default_subsystem: &str,
    ) -> Self {
        let pick = |over: &str, default: &str| {
            if over.is_empty() { default } else { over }.to_string()
        };
        Self {
            namespace: pick(&opts.namespace, default_namespace),
            subsystem: pick(&opts.subsystem, default_subsystem),
            name: name.to_string(),
        }
    }

    /// Fully-qualified name: non-empty parts joined with `_`.
    pub fn fq_name(&self) -> String {
        [&self.namespace, &self.subsystem, &self.name]
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join("_")
    }
}
