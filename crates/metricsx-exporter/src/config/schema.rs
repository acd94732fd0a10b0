use std::collections::BTreeMap;

use serde::Deserialize;
use metricsx_core::error::{MetricsError, Result};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// `prometheus` or `noop`; anything else falls back to `noop`.
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default)]
    pub prometheus: PrometheusConfig,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            provider: default_provider(),
            prometheus: PrometheusConfig::default(),
        }
    }
}

impl MetricsConfig {
    pub fn validate(&self) -> Result<()> {
        self.prometheus.validate()
    }

    /// Normalized copy. The receiver is left untouched.
    pub fn sanitize(&self) -> MetricsConfig {
        let mut out = self.clone();
        out.provider = out.provider.trim().to_ascii_lowercase();
        if out.prometheus.path.trim().is_empty() {
            out.prometheus.path = default_path();
        }
        out
    }

    /// Key fields for startup logging.
    pub fn summary(&self) -> BTreeMap<&'static str, String> {
        let p = &self.prometheus;
        BTreeMap::from([
            ("enabled", self.enabled.to_string()),
            ("provider", self.provider.clone()),
            ("path", p.path.clone()),
            ("port", p.port.to_string()),
            ("namespace", p.namespace.clone()),
            ("subsystem", p.subsystem.clone()),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrometheusConfig {
    /// Default namespace for every metric.
    #[serde(default)]
    pub namespace: String,

    /// Default subsystem for every metric.
    #[serde(default)]
    pub subsystem: String,

    #[serde(default = "default_path")]
    pub path: String,

    /// 0 = exposition is mounted on the host's server.
    #[serde(default)]
    pub port: u16,

    #[serde(default = "default_true")]
    pub enable_process_metrics: bool,

    #[serde(default = "default_true", alias = "enable_go_metrics")]
    pub enable_runtime_metrics: bool,
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self {
            namespace: String::new(),
            subsystem: String::new(),
            path: default_path(),
            port: 0,
            enable_process_metrics: true,
            enable_runtime_metrics: true,
        }
    }
}

impl PrometheusConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.path.starts_with('/') {
            return Err(MetricsError::Config(
                "metrics.prometheus.path must start with '/'".into(),
            ));
        }
        for (field, value) in [("namespace", &self.namespace), ("subsystem", &self.subsystem)] {
            if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(MetricsError::Config(format!(
                    "metrics.prometheus.{field} may only contain [a-zA-Z0-9_]"
                )));
            }
        }
        Ok(())
    }
}

fn default_enabled() -> bool {
    true
}
fn default_true() -> bool {
    true
}
fn default_provider() -> String {
    "prometheus".into()
}
fn default_path() -> String {
    "/metrics".into()
}
