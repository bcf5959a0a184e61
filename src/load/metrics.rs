//! Load test metrics
//!
//! Latency percentiles, throughput and error rate computed from the
//! samples collected by load workers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::http::HttpError;

/// Error samples kept verbatim for diagnostics
const MAX_ERROR_SAMPLES: usize = 5;

/// Nearest-rank percentile of an ascending slice.
///
/// Returns the smallest sample such that at least `p` percent of samples
/// are less than or equal to it. An empty slice yields 0.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (p * sorted.len() as f64 / 100.0).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

/// Error statistics
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorStats {
    /// Connection errors
    pub connection_errors: u64,
    /// Timeout errors
    pub timeout_errors: u64,
    /// HTTP 4xx responses
    pub client_errors: u64,
    /// HTTP 5xx responses
    pub server_errors: u64,
    /// Unexpected statuses and anything else
    pub other_errors: u64,
}

impl ErrorStats {
    /// Total error count
    pub fn total(&self) -> u64 {
        self.connection_errors
            + self.timeout_errors
            + self.client_errors
            + self.server_errors
            + self.other_errors
    }

    /// Record a response that was not an acceptance
    pub fn record_status(&mut self, status_code: u16) {
        match status_code {
            400..=499 => self.client_errors += 1,
            500..=599 => self.server_errors += 1,
            _ => self.other_errors += 1,
        }
    }

    /// Record a transport failure
    pub fn record_transport(&mut self, error: &anyhow::Error) {
        match error.downcast_ref::<HttpError>() {
            Some(HttpError::Timeout(_)) => self.timeout_errors += 1,
            Some(HttpError::ConnectionRefused(_)) => self.connection_errors += 1,
            _ => self.other_errors += 1,
        }
    }

    pub fn merge(&mut self, other: &ErrorStats) {
        self.connection_errors += other.connection_errors;
        self.timeout_errors += other.timeout_errors;
        self.client_errors += other.client_errors;
        self.server_errors += other.server_errors;
        self.other_errors += other.other_errors;
    }
}

/// Samples collected privately by one worker, merged after the run
#[derive(Clone, Debug, Default)]
pub struct WorkerSamples {
    /// Latency of each accepted request in milliseconds
    latencies_ms: Vec<f64>,
    errors: ErrorStats,
    error_samples: Vec<String>,
}

impl WorkerSamples {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an accepted request
    pub fn record_success(&mut self, latency_ms: f64) {
        self.latencies_ms.push(latency_ms);
    }

    /// Record a response with an unexpected status
    pub fn record_status(&mut self, status_code: u16) {
        self.errors.record_status(status_code);
        self.keep_sample(format!("unexpected HTTP {status_code}"));
    }

    /// Record a transport failure
    pub fn record_transport(&mut self, error: &anyhow::Error) {
        self.errors.record_transport(error);
        self.keep_sample(error.to_string());
    }

    /// Record a failure that is neither a status nor a transport error
    pub fn record_other(&mut self, message: impl Into<String>) {
        self.errors.other_errors += 1;
        self.keep_sample(message.into());
    }

    fn keep_sample(&mut self, message: String) {
        if self.error_samples.len() < MAX_ERROR_SAMPLES {
            self.error_samples.push(message);
        }
    }

    pub fn success_count(&self) -> usize {
        self.latencies_ms.len()
    }

    pub fn error_count(&self) -> u64 {
        self.errors.total()
    }

    /// Append another worker's samples
    pub fn merge(&mut self, other: WorkerSamples) {
        self.latencies_ms.extend(other.latencies_ms);
        self.errors.merge(&other.errors);
        for message in other.error_samples {
            self.keep_sample(message);
        }
    }

    /// Compute metrics over a wall-clock span
    pub fn finalize(self, elapsed: Duration) -> LoadMetrics {
        LoadMetrics::from_samples(&self.latencies_ms, self.errors, self.error_samples, elapsed)
    }
}

/// Aggregate load test metrics
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadMetrics {
    /// Successful plus failed requests
    pub total_requests: u64,
    /// Requests answered with 202
    pub successful_requests: u64,
    /// Every other outcome
    pub failed_requests: u64,
    /// Mean latency of successful requests in milliseconds
    pub avg_latency_ms: f64,
    pub min_latency_ms: f64,
    pub max_latency_ms: f64,
    /// Nearest-rank 95th percentile
    pub p95_latency_ms: f64,
    /// Successful requests per second of wall-clock span
    pub throughput_rps: f64,
    /// failed / total
    pub error_rate: f64,
    /// Wall-clock span of the run in seconds
    pub duration_secs: f64,
    /// Failure breakdown
    pub errors: ErrorStats,
    /// First few failure messages
    pub error_samples: Vec<String>,
}

impl LoadMetrics {
    /// Calculate metrics from successful latencies and failure counts.
    ///
    /// With no successes every latency figure and the throughput are 0 and
    /// the error rate is 1.0.
    pub fn from_samples(
        latencies_ms: &[f64],
        errors: ErrorStats,
        error_samples: Vec<String>,
        elapsed: Duration,
    ) -> Self {
        let successful = latencies_ms.len() as u64;
        let failed = errors.total();
        let total = successful + failed;
        let duration_secs = elapsed.as_secs_f64();

        if latencies_ms.is_empty() {
            return Self {
                total_requests: total,
                failed_requests: failed,
                error_rate: 1.0,
                duration_secs,
                errors,
                error_samples,
                ..Default::default()
            };
        }

        let mut sorted = latencies_ms.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let sum: f64 = sorted.iter().sum();
        let throughput_rps = if duration_secs > 0.0 {
            successful as f64 / duration_secs
        } else {
            0.0
        };

        Self {
            total_requests: total,
            successful_requests: successful,
            failed_requests: failed,
            avg_latency_ms: sum / sorted.len() as f64,
            min_latency_ms: sorted[0],
            max_latency_ms: sorted[sorted.len() - 1],
            p95_latency_ms: percentile(&sorted, 95.0),
            throughput_rps,
            error_rate: failed as f64 / total as f64,
            duration_secs,
            errors,
            error_samples,
        }
    }

    /// Format as summary string
    pub fn format_summary(&self) -> String {
        format!(
            "requests={} ok={} failed={} rps={:.2} avg={:.2}ms p95={:.2}ms error_rate={:.2}%",
            self.total_requests,
            self.successful_requests,
            self.failed_requests,
            self.throughput_rps,
            self.avg_latency_ms,
            self.p95_latency_ms,
            self.error_rate * 100.0
        )
    }
}

impl fmt::Display for LoadMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_summary())
    }
}
