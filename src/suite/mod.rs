//! Functional test suite
//!
//! Runs the gateway checks category by category. Categories are independent:
//! an error or panic escaping one is recorded as a synthetic failed result
//! and the suite moves on.
//!
//! ## Categories
//!
//! 1. Health
//! 2. Event validation
//! 3. Anti-spam
//! 4. Batch processing
//! 5. Streaming
//! 6. Metrics exposition
//! 7. Error handling
//! 8. Status detail

mod endpoints;
mod events;
mod preflight;
mod probe;
mod streaming;

use anyhow::Result;
use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Instant;
use tracing::{error, info};

use crate::config::HarnessConfig;
use crate::generator::generate_valid_event;
use crate::http::HttpClient;
use crate::models::{ResultLog, TestResult};

pub use preflight::check_reachable;
pub use probe::EventProber;

/// Functional test categories in execution order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TestCategory {
    Health,
    Validation,
    AntiSpam,
    Batch,
    Streaming,
    Metrics,
    ErrorHandling,
    Status,
}

impl TestCategory {
    pub fn all() -> [TestCategory; 8] {
        [
            TestCategory::Health,
            TestCategory::Validation,
            TestCategory::AntiSpam,
            TestCategory::Batch,
            TestCategory::Streaming,
            TestCategory::Metrics,
            TestCategory::ErrorHandling,
            TestCategory::Status,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            TestCategory::Health => "Health",
            TestCategory::Validation => "Event Validation",
            TestCategory::AntiSpam => "Anti-Spam",
            TestCategory::Batch => "Batch Processing",
            TestCategory::Streaming => "Streaming",
            TestCategory::Metrics => "Metrics Exposition",
            TestCategory::ErrorHandling => "Error Handling",
            TestCategory::Status => "Status Detail",
        }
    }

    /// Leading test-name segment of the category's results
    pub fn slug(&self) -> &'static str {
        match self {
            TestCategory::Health => "health",
            TestCategory::Validation => "invalid",
            TestCategory::AntiSpam => "duplicate",
            TestCategory::Batch => "batch",
            TestCategory::Streaming => "websocket",
            TestCategory::Metrics => "metrics",
            TestCategory::ErrorHandling => "error",
            TestCategory::Status => "status",
        }
    }

    /// Name of the result recorded when the category aborts
    pub fn fatal_name(&self) -> String {
        format!("{}_fatal", self.slug())
    }
}

impl fmt::Display for TestCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Gateway functional test suite
pub struct GatewayTestSuite {
    config: HarnessConfig,
    client: HttpClient,
    prober: EventProber,
}

impl GatewayTestSuite {
    /// Create a suite bound to the configured gateway
    pub fn new(config: &HarnessConfig) -> Result<Self> {
        let client =
            HttpClient::with_timeout(config.timeout_secs)?.base_url(config.gateway_url.clone());
        Ok(Self {
            config: config.clone(),
            prober: EventProber::new(client.clone()),
            client,
        })
    }

    /// Abort early when the gateway cannot be reached at all
    pub async fn preflight(&self) -> Result<()> {
        check_reachable(&self.client).await
    }

    /// Run every category in order
    pub async fn run_all(&self) -> ResultLog {
        self.run_categories(&TestCategory::all()).await
    }

    /// Run the given categories in order
    pub async fn run_categories(&self, categories: &[TestCategory]) -> ResultLog {
        info!("Starting functional suite against {}", self.config.gateway_url);
        let start = Instant::now();
        let mut log = ResultLog::new();

        for category in categories {
            self.run_category(*category, &mut log).await;
        }

        info!(
            "Functional suite completed in {}ms - Pass: {}/{}",
            start.elapsed().as_millis(),
            log.passed(),
            log.len()
        );
        log
    }

    /// Smoke test: health, one valid event, status
    pub async fn run_quick(&self) -> ResultLog {
        info!("Running quick smoke test against {}", self.config.gateway_url);
        let mut log = ResultLog::new();

        log.record(self.health_result("health_check").await);
        let event = generate_valid_event(&self.config.device_id);
        log.record(self.prober.probe_event(&event, "smoke_test_event", true).await);
        log.record(self.status_result("status_endpoint").await);

        log
    }

    async fn run_category(&self, category: TestCategory, log: &mut ResultLog) {
        info!("=== {} ===", category);

        if let Some(fatal) = guarded(category, self.dispatch(category, log)).await {
            log.record(fatal);
        }
    }

    async fn dispatch(&self, category: TestCategory, log: &mut ResultLog) -> Result<()> {
        match category {
            TestCategory::Health => self.check_health(log).await,
            TestCategory::Validation => self.check_validation(log).await,
            TestCategory::AntiSpam => self.check_anti_spam(log).await,
            TestCategory::Batch => self.check_batch_processing(log).await,
            TestCategory::Streaming => self.check_streaming(log).await,
            TestCategory::Metrics => self.check_metrics(log).await,
            TestCategory::ErrorHandling => self.check_error_handling(log).await,
            TestCategory::Status => self.check_status(log).await,
        }
    }
}

/// Await one category's checks.
///
/// An error or panic escaping `checks` becomes a failed `{slug}_fatal` result.
async fn guarded<F>(category: TestCategory, checks: F) -> Option<TestResult>
where
    F: Future<Output = Result<()>>,
{
    let failure = match AssertUnwindSafe(checks).catch_unwind().await {
        Ok(Ok(())) => return None,
        Ok(Err(e)) => format!("{e:#}"),
        Err(panic) => format!("panicked: {}", panic_message(panic.as_ref())),
    };

    error!("{} category aborted: {}", category, failure);
    Some(TestResult::fail(category.fatal_name(), 0.0, failure))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
