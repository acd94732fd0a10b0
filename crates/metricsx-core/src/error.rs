//! Shared error type across metricsx crates.

use thiserror::Error;

use crate::metric::MetricKind;

/// Stable error classification (safe to log and match on).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid or unreadable configuration.
    Config,
    /// Backend rejected a metric declaration.
    Registration,
    /// Exposition listener failed to bind or serve.
    Transport,
    /// Registry state could not be rendered.
    Render,
    /// Lifecycle call ran past its deadline.
    DeadlineExceeded,
}

impl ErrorKind {
    /// String representation used in logs and tests.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Config => "CONFIG",
            ErrorKind::Registration => "REGISTRATION",
            ErrorKind::Transport => "TRANSPORT",
            ErrorKind::Render => "RENDER",
            ErrorKind::DeadlineExceeded => "DEADLINE_EXCEEDED",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Unified error type used by core and backends.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("config: {0}")]
    Config(String),
    #[error("register {kind} {name:?}: {reason}")]
    Registration {
        kind: MetricKind,
        name: String,
        reason: String,
    },
    #[error("transport: {0}")]
    Transport(String),
    #[error("render: {0}")]
    Render(String),
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl MetricsError {
    pub fn registration(kind: MetricKind, name: &str, reason: impl ToString) -> Self {
        MetricsError::Registration {
            kind,
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Map to the stable classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MetricsError::Config(_) => ErrorKind::Config,
            MetricsError::Registration { .. } => ErrorKind::Registration,
            MetricsError::Transport(_) => ErrorKind::Transport,
            MetricsError::Render(_) => ErrorKind::Render,
            MetricsError::DeadlineExceeded => ErrorKind::DeadlineExceeded,
        }
    }
}
