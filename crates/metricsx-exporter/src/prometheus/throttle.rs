//! Per-metric log throttling for misuse warnings.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct WindowState {
    window_started_at: Option<Instant>,
    suppressed: u64,
}

#[derive(Debug)]
pub(crate) struct LogThrottle {
    interval: Duration,
    state: Mutex<WindowState>,
}

impl LogThrottle {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            interval,
            state: Mutex::new(WindowState {
                window_started_at: None,
                suppressed: 0,
            }),
        }
    }

    /// Returns `Some(suppressed_count)` when a log should be emitted,
    /// otherwise `None` and the event is counted as suppressed for the active window.
    pub(crate) fn should_emit(&self) -> Option<u64> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        match state.window_started_at {
            Some(started) if now.duration_since(started) < self.interval => {
                state.suppressed += 1;
                None
            }
            _ => {
                let suppressed = state.suppressed;
                state.window_started_at = Some(now);
                state.suppressed = 0;
                Some(suppressed)
            }
        }
    }
}

impl Default for LogThrottle {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}
