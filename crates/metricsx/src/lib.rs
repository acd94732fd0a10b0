//! Top-level facade crate for metricsx.
//!
//! Re-exports the core contracts and the exporter backends so applications can
//! depend on a single crate.

pub mod core {
    pub use metricsx_core::*;
}

pub mod exporter {
    pub use metricsx_exporter::*;
}

pub use metricsx_core::{Metrics, MetricOptions, Result};
