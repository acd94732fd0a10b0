//! Shared helpers for exporter integration tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use metricsx_exporter::config::PrometheusConfig;
use metricsx_exporter::prometheus::PrometheusProvider;
use prometheus::proto::Metric;

/// Provider without default collectors and without its own listener.
pub fn bare_provider() -> PrometheusProvider {
    PrometheusProvider::new(bare_config()).unwrap()
}

pub fn bare_config() -> PrometheusConfig {
    PrometheusConfig {
        enable_process_metrics: false,
        enable_runtime_metrics: false,
        ..PrometheusConfig::default()
    }
}

/// Series of family `name` whose labels equal `labels` (order-insensitive).
pub fn find_series(p: &PrometheusProvider, name: &str, labels: &[(&str, &str)]) -> Option<Metric> {
    let families = p.registry().registry().gather();
    let family = families.into_iter().find(|mf| mf.get_name() == name)?;
    family.get_metric().iter().cloned().find(|m| {
        m.get_label().len() == labels.len()
            && labels.iter().all(|(k, v)| {
                m.get_label()
                    .iter()
                    .any(|lp| lp.get_name() == *k && lp.get_value() == *v)
            })
    })
}

pub fn counter_value(p: &PrometheusProvider, name: &str, labels: &[(&str, &str)]) -> f64 {
    find_series(p, name, labels)
        .unwrap_or_else(|| panic!("no series {name} {labels:?}"))
        .get_counter()
        .get_value()
}

pub fn gauge_value(p: &PrometheusProvider, name: &str, labels: &[(&str, &str)]) -> f64 {
    find_series(p, name, labels)
        .unwrap_or_else(|| panic!("no series {name} {labels:?}"))
        .get_gauge()
        .get_value()
}

/// In-memory sink for captured log output.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

/// Run `f` with a scoped subscriber and return its result plus the logs.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buf = LogBuffer::default();
    let writer = buf.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, buf.contents())
}
