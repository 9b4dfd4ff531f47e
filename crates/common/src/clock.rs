//! Clock utilities for timing a pipeline run.
//!
//! Every run is anchored to a monotonic instant recorded when the run
//! starts. Elapsed time is measured against that instant; the wall-clock
//! start is kept only for logs and reports.

use std::time::{Duration, Instant};

/// A run clock that measures monotonic time since a fixed start.
#[derive(Debug, Clone)]
pub struct ProcessingClock {
    /// The instant the run started.
    started: Instant,

    /// Wall-clock time at start (RFC 3339 string).
    started_wall: String,
}

impl ProcessingClock {
    /// Create a new clock anchored to now.
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            started_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Time elapsed since the clock started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Seconds elapsed since the clock started.
    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// Wall-clock time at start.
    pub fn started_wall(&self) -> &str {
        &self.started_wall
    }

    /// The underlying start instant.
    pub fn started(&self) -> Instant {
        self.started
    }
}

/// Format a duration as seconds with millisecond precision, e.g. `2.560s`.
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.3}s", elapsed.as_secs_f64())
}
