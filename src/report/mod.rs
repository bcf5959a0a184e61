//! Report generation for test results
//!
//! Turns an ordered result list and optional load metrics into a grouped
//! summary. Rendering is pure; persisting is a separate step.

mod export;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::load::LoadMetrics;
use crate::models::TestResult;

pub use export::ReportFormat;

/// Pass counts for one report heading
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategorySummary {
    pub name: String,
    pub passed: usize,
    pub total: usize,
}

impl CategorySummary {
    /// Passed / total; 0 for an empty category
    pub fn pass_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.passed as f64 / self.total as f64
        }
    }
}

/// Rendered report plus the figures it was built from
#[derive(Clone, Debug, Serialize)]
pub struct TestReport {
    #[serde(skip)]
    pub text: String,
    pub generated_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub categories: Vec<CategorySummary>,
    pub results: Vec<TestResult>,
    pub load_metrics: Option<LoadMetrics>,
}

impl TestReport {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Report generator
pub struct Reporter;

impl Reporter {
    /// Build the report. Identical inputs give identical text.
    pub fn generate(
        results: &[TestResult],
        load_metrics: Option<&LoadMetrics>,
        generated_at: DateTime<Utc>,
    ) -> TestReport {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        let failed = total - passed;
        let categories = categorize(results);

        let mut text = String::new();
        text.push_str(&format!("\n{:=^70}\n", " FanPulse Gateway Test Report "));
        text.push_str(&format!("Generated: {}\n\n", format_datetime(&generated_at)));

        text.push_str(&format!("{:-^70}\n", " Summary "));
        text.push_str(&format!("Total Tests: {total}\n"));
        text.push_str(&format!(
            "Passed: {} ({:.1}%)\n",
            passed,
            percent(passed, total)
        ));
        text.push_str(&format!(
            "Failed: {} ({:.1}%)\n\n",
            failed,
            percent(failed, total)
        ));

        let (avg, max) = duration_stats(results);
        text.push_str(&format!("{:-^70}\n", " Performance "));
        text.push_str(&format!("Average Response Time: {avg:.2}ms\n"));
        text.push_str(&format!("Maximum Response Time: {max:.2}ms\n\n"));

        text.push_str(&format!("{:-^70}\n", " Test Results "));
        for category in &categories {
            text.push_str(&format!(
                "\n{} ({}/{}, {:.1}%)\n",
                category.name.to_uppercase(),
                category.passed,
                category.total,
                category.pass_ratio() * 100.0
            ));
            text.push_str(&format!("{:-<40}\n", ""));

            for result in results.iter().filter(|r| r.category() == category.name) {
                let status = if result.passed { "✓ PASS" } else { "✗ FAIL" };
                text.push_str(&format!(
                    "{} {} ({:.2}ms)\n",
                    status, result.test_name, result.duration_ms
                ));
                if let (false, Some(message)) = (result.passed, &result.error_message) {
                    text.push_str(&format!("      Error: {message}\n"));
                }
            }
        }

        if let Some(metrics) = load_metrics {
            text.push_str(&format_load_section(metrics));
        }

        text.push_str(&format!("\n{:=^70}\n", ""));

        TestReport {
            text,
            generated_at,
            total,
            passed,
            failed,
            categories,
            results: results.to_vec(),
            load_metrics: load_metrics.cloned(),
        }
    }
}

/// Group by leading name segment in first-appearance order
fn categorize(results: &[TestResult]) -> Vec<CategorySummary> {
    let mut categories: Vec<CategorySummary> = Vec::new();

    for result in results {
        let name = result.category();
        let index = match categories.iter().position(|c| c.name == name) {
            Some(index) => index,
            None => {
                categories.push(CategorySummary {
                    name: name.to_string(),
                    passed: 0,
                    total: 0,
                });
                categories.len() - 1
            }
        };

        let category = &mut categories[index];
        category.total += 1;
        if result.passed {
            category.passed += 1;
        }
    }

    categories
}

fn format_load_section(metrics: &LoadMetrics) -> String {
    let mut section = String::new();
    section.push_str(&format!("\n{:-^70}\n", " Load Test Results "));
    section.push_str(&format!("Total Requests: {}\n", metrics.total_requests));
    section.push_str(&format!("Successful: {}\n", metrics.successful_requests));
    section.push_str(&format!("Failed: {}\n", metrics.failed_requests));
    section.push_str(&format!("Throughput: {:.2} RPS\n", metrics.throughput_rps));
    section.push_str(&format!("Error Rate: {:.2}%\n", metrics.error_rate * 100.0));
    section.push_str(&format!(
        "Average Response Time: {:.2}ms\n",
        metrics.avg_latency_ms
    ));
    section.push_str(&format!(
        "Min/Max Response Time: {:.2}ms / {:.2}ms\n",
        metrics.min_latency_ms, metrics.max_latency_ms
    ));
    section.push_str(&format!(
        "95th Percentile: {:.2}ms\n",
        metrics.p95_latency_ms
    ));

    if metrics.failed_requests > 0 {
        let errors = &metrics.errors;
        section.push_str(&format!(
            "Errors: connection={} timeout={} 4xx={} 5xx={} other={}\n",
            errors.connection_errors,
            errors.timeout_errors,
            errors.client_errors,
            errors.server_errors,
            errors.other_errors
        ));
        for sample in &metrics.error_samples {
            section.push_str(&format!("  - {sample}\n"));
        }
    }
    section
}

fn duration_stats(results: &[TestResult]) -> (f64, f64) {
    if results.is_empty() {
        return (0.0, 0.0);
    }
    let sum: f64 = results.iter().map(|r| r.duration_ms).sum();
    let max = results
        .iter()
        .map(|r| r.duration_ms)
        .fold(0.0_f64, f64::max);
    (sum / results.len() as f64, max)
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
