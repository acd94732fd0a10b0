//! metricsx exporter library entry.
//!
//! Wires the Prometheus backend, strict configuration, exposition endpoints,
//! and provider selection into the stack host applications start and stop.
//! Consumed by the binary (`main.rs`) and by integration tests.

pub mod config;
pub mod module;
pub mod ops;
pub mod prometheus;
pub mod server;

pub use module::{MetricsModule, ProviderKind};
