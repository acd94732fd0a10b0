//! metricsx core: provider-agnostic metric contracts.
//!
//! Application code declares named, labeled metrics through [`Metrics`]; a
//! pluggable [`Provider`] performs the recording and owns exposition. This
//! crate carries no runtime or backend dependencies. The only backend shipped
//! here is [`noop::NoopProvider`].
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. All fallible paths
//! surface as `MetricsError`/`Result` so a misdeclared metric never crashes
//! the host process from inside this crate.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod context;
pub mod error;
pub mod facade;
pub mod metric;
pub mod noop;
pub mod options;
pub mod provider;

pub use context::Context;
pub use error::{ErrorKind, MetricsError, Result};
pub use facade::Metrics;
pub use metric::{Counter, Gauge, Histogram, MetricKind, Summary, Timer};
pub use options::{MetricIdentity, MetricOption, MetricOptions, Objective};
pub use provider::{Exposition, Provider};
