//! Event submission checks: validation, anti-spam, batching, malformed bodies

use anyhow::{Context, Result};
use serde_json::json;
use tokio::time::sleep;
use tracing::{error, info};

use super::GatewayTestSuite;
use crate::generator::{
    generate_invalid_events, generate_valid_event, now_millis, unauthorized_event,
};
use crate::models::{BatchStatus, ChantEvent, Endpoint, ResultLog, TestResult};
use crate::utils::Timer;

/// Match shared by every event of the batch check
const BATCH_MATCH_ID: u32 = 99_999;

/// Bodies the gateway must refuse with a client error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MalformedRequest {
    MalformedJson,
    EmptyPayload,
    WrongContentType,
    OversizedPayload,
}

impl MalformedRequest {
    pub fn all() -> [MalformedRequest; 4] {
        [
            MalformedRequest::MalformedJson,
            MalformedRequest::EmptyPayload,
            MalformedRequest::WrongContentType,
            MalformedRequest::OversizedPayload,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            MalformedRequest::MalformedJson => "malformed_json",
            MalformedRequest::EmptyPayload => "empty_payload",
            MalformedRequest::WrongContentType => "wrong_content_type",
            MalformedRequest::OversizedPayload => "oversized_payload",
        }
    }

    pub fn body(&self) -> String {
        match self {
            MalformedRequest::MalformedJson => "invalid json".to_string(),
            MalformedRequest::EmptyPayload => String::new(),
            MalformedRequest::WrongContentType => r#"{"test": "data"}"#.to_string(),
            // Well past a 16 KiB body limit
            MalformedRequest::OversizedPayload => "x".repeat(50_000),
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            MalformedRequest::WrongContentType => "text/plain",
            _ => "application/json",
        }
    }

    pub fn test_name(&self) -> String {
        format!("error_handling_{}", self.name())
    }
}

impl GatewayTestSuite {
    pub(super) async fn check_validation(&self, log: &mut ResultLog) -> Result<()> {
        let device_id = &self.config.device_id;

        let event = generate_valid_event(device_id);
        log.record(self.prober.probe_event(&event, "valid_event", true).await);

        let invalid =
            generate_invalid_events(device_id).context("Failed to build invalid events")?;
        for (index, case) in invalid.iter().enumerate() {
            let result = self
                .prober
                .probe(&case.payload, &case.test_name(index), false)
                .await;
            log.record(result);
        }
        Ok(())
    }

    pub(super) async fn check_anti_spam(&self, log: &mut ResultLog) -> Result<()> {
        let unauthorized = unauthorized_event();
        log.record(
            self.prober
                .probe_event(&unauthorized, "unauthorized_device", false)
                .await,
        );

        let payload = generate_valid_event(&self.config.device_id)
            .to_payload()
            .context("Failed to encode replay event")?;
        log.record(
            self.prober
                .probe(&payload, "duplicate_test_first", true)
                .await,
        );

        sleep(self.config.timing.replay_delay()).await;
        log.record(
            self.prober
                .probe(&payload, "duplicate_test_second", false)
                .await,
        );
        Ok(())
    }

    pub(super) async fn check_batch_processing(&self, log: &mut ResultLog) -> Result<()> {
        let timing = &self.config.timing;
        let base_ts = now_millis();

        let events: Vec<ChantEvent> = (0..timing.batch_size)
            .map(|i| {
                let mut event = generate_valid_event(&self.config.device_id);
                event.match_id = BATCH_MATCH_ID;
                event.ts = base_ts + i as i64;
                event
            })
            .collect();

        for (i, event) in events.iter().enumerate() {
            let result = self
                .prober
                .probe_event(event, &format!("batch_event_{i}"), true)
                .await;
            log.record(result);
            sleep(timing.batch_interval()).await;
        }

        let name = "batch_processing_status";
        let timer = Timer::start(name);
        let result = match self.get_json(Endpoint::Status).await {
            Ok(doc) => {
                let batches = BatchStatus::from_status(&doc);
                info!("Batch status: {} batches created", batches.total);
                TestResult::verdict(
                    name,
                    batches.total > 0,
                    timer.stop(),
                    "gateway reports no batches",
                )
                .with_response(json!({ "batches": doc.get("batches") }))
            }
            Err(message) => {
                error!("✗ Failed to get batch status - {}", message);
                TestResult::fail(name, timer.stop(), message)
            }
        };
        log.record(result);
        Ok(())
    }

    pub(super) async fn check_error_handling(&self, log: &mut ResultLog) -> Result<()> {
        for case in MalformedRequest::all() {
            let name = case.test_name();
            let timer = Timer::start(name.as_str());

            let response = self
                .client
                .post_raw(Endpoint::Events.path(), case.body(), case.content_type())
                .await;

            let result = match response {
                Ok(resp) => {
                    let passed = resp.is_client_error();
                    if passed {
                        info!("✓ Error handling {} - HTTP {}", case.name(), resp.status_code);
                    } else {
                        error!("✗ Error handling {} - HTTP {}", case.name(), resp.status_code);
                    }
                    TestResult::verdict(
                        name,
                        passed,
                        timer.stop(),
                        format!("expected client error, got HTTP {}", resp.status_code),
                    )
                    .with_response(json!({ "status_code": resp.status_code }))
                }
                Err(e) => {
                    error!("✗ Error handling {} failed: {:#}", case.name(), e);
                    TestResult::fail(name, timer.stop(), format!("{e:#}"))
                }
            };
            log.record(result);
        }
        Ok(())
    }
}
