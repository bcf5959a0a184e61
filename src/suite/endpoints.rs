//! Read-only endpoint checks: health, metrics exposition, status detail

use anyhow::Result;
use serde_json::{json, Value};
use tracing::{error, info};

use super::GatewayTestSuite;
use crate::models::{Endpoint, ResultLog, TestResult, REQUIRED_METRICS, STATUS_SECTIONS};
use crate::utils::Timer;

impl GatewayTestSuite {
    pub(super) async fn check_health(&self, log: &mut ResultLog) -> Result<()> {
        log.record(self.health_result("health_check").await);
        Ok(())
    }

    pub(super) async fn check_metrics(&self, log: &mut ResultLog) -> Result<()> {
        log.record(self.metrics_result("metrics_endpoint").await);
        Ok(())
    }

    pub(super) async fn check_status(&self, log: &mut ResultLog) -> Result<()> {
        log.record(self.status_result("status_endpoint").await);
        Ok(())
    }

    /// GET `endpoint` expecting 200 with a JSON body
    pub(super) async fn get_json(&self, endpoint: Endpoint) -> Result<Value, String> {
        let response = self
            .client
            .get(endpoint.path())
            .await
            .map_err(|e| format!("{e:#}"))?;

        if response.status_code != 200 {
            return Err(format!("HTTP {}", response.status_code));
        }
        response
            .json()
            .ok_or_else(|| format!("{} returned a non-JSON body", endpoint))
    }

    pub(super) async fn health_result(&self, name: &str) -> TestResult {
        let timer = Timer::start(name);

        match self.get_json(Endpoint::Health).await {
            Ok(doc) => {
                let passed = doc.get("status").and_then(Value::as_str) == Some("healthy")
                    && doc.get("uptime").is_some()
                    && doc.get("services").is_some();

                if passed {
                    info!("✓ Health check passed - uptime: {}s", doc["uptime"]);
                } else {
                    error!("✗ Health check failed - unexpected health document");
                }
                TestResult::verdict(
                    name,
                    passed,
                    timer.stop(),
                    "health document lacks status \"healthy\", uptime or services",
                )
                .with_response(doc)
            }
            Err(message) => {
                error!("✗ Health check failed - {}", message);
                TestResult::fail(name, timer.stop(), message)
            }
        }
    }

    pub(super) async fn metrics_result(&self, name: &str) -> TestResult {
        let timer = Timer::start(name);

        let response = match self.client.get(Endpoint::Metrics.path()).await {
            Ok(response) => response,
            Err(e) => {
                error!("✗ Metrics endpoint failed: {:#}", e);
                return TestResult::fail(name, timer.stop(), format!("{e:#}"));
            }
        };
        if response.status_code != 200 {
            error!("✗ Metrics endpoint failed - HTTP {}", response.status_code);
            return TestResult::fail(
                name,
                timer.stop(),
                format!("HTTP {}", response.status_code),
            );
        }

        let (found, missing): (Vec<&str>, Vec<&str>) = REQUIRED_METRICS
            .into_iter()
            .partition(|metric| response.body_contains(metric));
        let passed = missing.is_empty();

        if passed {
            info!("✓ Metrics endpoint passed - found {} metrics", found.len());
        } else {
            error!("✗ Metrics endpoint missing {}", missing.join(", "));
        }

        TestResult::verdict(
            name,
            passed,
            timer.stop(),
            format!("missing metrics: {}", missing.join(", ")),
        )
        .with_response(json!({
            "expected_metrics": REQUIRED_METRICS,
            "found_metrics": found,
            "metrics_count": response.body.lines().count(),
        }))
    }

    pub(super) async fn status_result(&self, name: &str) -> TestResult {
        let timer = Timer::start(name);

        match self.get_json(Endpoint::Status).await {
            Ok(doc) => {
                let missing: Vec<&str> = STATUS_SECTIONS
                    .into_iter()
                    .filter(|section| doc.get(*section).is_none())
                    .collect();
                let passed = missing.is_empty();

                if passed {
                    info!("✓ Status endpoint passed");
                    info!("  Events processed: {}", doc["events"]["totalProcessed"]);
                    info!("  Batches created: {}", doc["batches"]["total"]);
                } else {
                    error!("✗ Status endpoint missing {}", missing.join(", "));
                }

                TestResult::verdict(
                    name,
                    passed,
                    timer.stop(),
                    format!("missing sections: {}", missing.join(", ")),
                )
                .with_response(doc)
            }
            Err(message) => {
                error!("✗ Status endpoint failed - {}", message);
                TestResult::fail(name, timer.stop(), message)
            }
        }
    }
}
