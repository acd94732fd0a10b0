//! Metrics config loader (strict parsing).
//!
//! The metrics section lives under the `metrics` key of the host's YAML
//! document. Other top-level keys belong to the host and are left alone.

pub mod schema;

use std::fs;

use metricsx_core::error::{MetricsError, Result};

pub use schema::{MetricsConfig, PrometheusConfig};

/// Top-level key holding the metrics section.
pub const PREFIX: &str = "metrics";

pub fn load_from_file(path: &str) -> Result<MetricsConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| MetricsError::Config(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

/// Parse, normalize, then validate the metrics section.
pub fn load_from_str(s: &str) -> Result<MetricsConfig> {
    let doc: serde_yaml::Value = serde_yaml::from_str(s)
        .map_err(|e| MetricsError::Config(format!("invalid yaml: {e}")))?;

    let cfg = match doc.get(PREFIX) {
        None | Some(serde_yaml::Value::Null) => MetricsConfig::default(),
        Some(section) => serde_yaml::from_value(section.clone())
            .map_err(|e| MetricsError::Config(format!("invalid {PREFIX} section: {e}")))?,
    }
    .sanitize();
    cfg.validate()?;
    Ok(cfg)
}
