//! Load test performance targets

use serde::{Deserialize, Serialize};

use super::LoadMetrics;

/// Thresholds a load run must meet
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadTargets {
    /// Minimum successful requests per second
    pub min_throughput_rps: f64,
    /// Maximum failed / total
    pub max_error_rate: f64,
    /// Maximum mean latency in milliseconds
    pub max_avg_latency_ms: f64,
}

impl Default for LoadTargets {
    fn default() -> Self {
        Self {
            min_throughput_rps: 10.0,
            max_error_rate: 0.05,
            max_avg_latency_ms: 100.0,
        }
    }
}

impl LoadTargets {
    /// List every target the metrics miss; empty means all targets met
    pub fn evaluate(&self, metrics: &LoadMetrics) -> Vec<String> {
        let mut violations = Vec::new();

        if metrics.throughput_rps < self.min_throughput_rps {
            violations.push(format!(
                "throughput {:.2} rps below target {:.2} rps",
                metrics.throughput_rps, self.min_throughput_rps
            ));
        }
        if metrics.error_rate > self.max_error_rate {
            violations.push(format!(
                "error rate {:.2}% above target {:.2}%",
                metrics.error_rate * 100.0,
                self.max_error_rate * 100.0
            ));
        }
        if metrics.avg_latency_ms > self.max_avg_latency_ms {
            violations.push(format!(
                "average latency {:.2}ms above target {:.2}ms",
                metrics.avg_latency_ms, self.max_avg_latency_ms
            ));
        }

        violations
    }
}
