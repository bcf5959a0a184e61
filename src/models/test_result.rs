//! Test result models
//!
//! Defines the per-probe result record and the run-scoped result log.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of a single test execution
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub test_name: String,
    pub passed: bool,
    pub duration_ms: f64,
    pub error_message: Option<String>,
    pub response_data: Option<serde_json::Value>,
}

impl TestResult {
    pub fn pass(test_name: impl Into<String>, duration_ms: f64) -> Self {
        Self {
            test_name: test_name.into(),
            passed: true,
            duration_ms,
            error_message: None,
            response_data: None,
        }
    }

    pub fn fail(test_name: impl Into<String>, duration_ms: f64, message: impl Into<String>) -> Self {
        Self {
            test_name: test_name.into(),
            passed: false,
            duration_ms,
            error_message: Some(message.into()),
            response_data: None,
        }
    }

    /// Pass or fail depending on `passed`; failures carry `failure_message`
    pub fn verdict(
        test_name: impl Into<String>,
        passed: bool,
        duration_ms: f64,
        failure_message: impl Into<String>,
    ) -> Self {
        if passed {
            Self::pass(test_name, duration_ms)
        } else {
            Self::fail(test_name, duration_ms, failure_message)
        }
    }

    pub fn with_response(mut self, data: serde_json::Value) -> Self {
        self.response_data = Some(data);
        self
    }

    pub fn with_response_opt(mut self, data: Option<serde_json::Value>) -> Self {
        self.response_data = data;
        self
    }

    /// Report category: the first `_`-delimited segment of the test name.
    ///
    /// This is a naming convention, not a hierarchy: `batch_event_0` and
    /// `batch_processing_status` both land under `batch`.
    pub fn category(&self) -> &str {
        self.test_name.split('_').next().unwrap_or(&self.test_name)
    }

    pub fn symbol(&self) -> &'static str {
        if self.passed {
            "✓"
        } else {
            "✗"
        }
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{:.2}ms]",
            self.symbol(),
            self.test_name,
            self.duration_ms
        )?;
        if let Some(msg) = &self.error_message {
            write!(f, " - {msg}")?;
        }
        Ok(())
    }
}

/// Ordered, run-scoped collection of results.
///
/// Insertion order is execution order; the reporter relies on it for grouping.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResultLog {
    results: Vec<TestResult>,
}

impl ResultLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a result and return whether it passed
    pub fn record(&mut self, result: TestResult) -> bool {
        let passed = result.passed;
        self.results.push(result);
        passed
    }

    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    #[cfg(test)]
    pub fn find(&self, test_name: &str) -> Option<&TestResult> {
        self.results.iter().find(|r| r.test_name == test_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_creation() {
        let result = TestResult::pass("health_check", 12.5);
        assert!(result.passed);
        assert!(result.error_message.is_none());

        let result = TestResult::fail("status_endpoint", 3.0, "HTTP 500");
        assert!(!result.passed);
        assert_eq!(result.error_message.as_deref(), Some("HTTP 500"));
    }

    #[test]
    fn test_category_is_first_name_segment() {
        assert_eq!(TestResult::pass("batch_event_0", 1.0).category(), "batch");
        assert_eq!(TestResult::pass("batch_event_1", 1.0).category(), "batch");
        assert_eq!(TestResult::pass("health_check", 1.0).category(), "health");
        assert_eq!(TestResult::pass("standalone", 1.0).category(), "standalone");
    }

    #[test]
    fn test_result_display() {
        let result = TestResult::fail("metrics_endpoint", 4.0, "missing metrics");
        assert_eq!(
            result.to_string(),
            "✗ metrics_endpoint [4.00ms] - missing metrics"
        );
    }

    #[test]
    fn test_result_log() {
        let mut log = ResultLog::new();
        assert!(log.record(TestResult::pass("valid_event", 10.0)));
        assert!(!log.record(TestResult::fail("duplicate_test_second", 5.0, "accepted")));

        assert_eq!(log.len(), 2);
        assert_eq!(log.passed(), 1);
        assert_eq!(log.failed(), 1);
        assert!(!log.all_passed());
        assert_eq!(log.results()[0].test_name, "valid_event");
        assert!(log.find("duplicate_test_second").is_some());
    }
}
