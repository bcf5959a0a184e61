//! Timer utilities

use std::time::{Duration, Instant};

/// Wall-clock timer for a single test step
#[derive(Debug)]
pub struct Timer {
    start: Instant,
    label: String,
}

impl Timer {
    /// Create and start a new timer
    pub fn start(label: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            label: label.into(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Elapsed time in fractional milliseconds
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }

    /// Stop timer and return elapsed milliseconds
    pub fn stop(self) -> f64 {
        let elapsed_ms = self.elapsed_ms();
        tracing::debug!("{}: {:.2}ms", self.label, elapsed_ms);
        elapsed_ms
    }
}
