//! Streaming check: a submitted event while subscribed to the feed

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::time::sleep;
use tracing::{error, info, warn};

use super::GatewayTestSuite;
use crate::generator::generate_valid_event;
use crate::models::{Endpoint, ResultLog, TestResult, ACCEPTED};
use crate::stream::StreamListener;
use crate::utils::Timer;

impl GatewayTestSuite {
    pub(super) async fn check_streaming(&self, log: &mut ResultLog) -> Result<()> {
        let name = "websocket_communication";
        let timing = &self.config.timing;
        let timer = Timer::start(name);

        let listener = match StreamListener::connect(
            &self.config.websocket_url,
            timing.stream_connect_timeout(),
        )
        .await
        {
            Ok(listener) => listener,
            Err(e) => {
                error!("✗ Stream subscription failed: {}", e);
                log.record(TestResult::fail(name, timer.stop(), e.to_string()));
                return Ok(());
            }
        };

        sleep(timing.stream_settle()).await;

        let payload = generate_valid_event(&self.config.device_id)
            .to_payload()
            .context("Failed to encode streamed event")?;
        let post_status = match self.client.post_json(Endpoint::Events.path(), &payload).await {
            Ok(response) => Some(response.status_code),
            Err(e) => {
                warn!("Streamed event submission failed: {:#}", e);
                None
            }
        };

        sleep(timing.stream_window()).await;
        let observation = listener.close().await;

        let connected = observation.connected() > 0;
        let accepted = post_status == Some(ACCEPTED);
        let failure = if !connected {
            "no connected message received on stream".to_string()
        } else {
            match post_status {
                Some(status) => format!("event submission returned HTTP {status}"),
                None => "event submission failed".to_string(),
            }
        };

        info!(
            "Stream observed {} messages ({} connected, {} event_received)",
            observation.total(),
            observation.connected(),
            observation.event_received()
        );

        let mut data = observation.summary();
        data["post_status"] = post_status.map(Value::from).unwrap_or(Value::Null);

        log.record(
            TestResult::verdict(name, connected && accepted, timer.stop(), failure)
                .with_response(data),
        );
        Ok(())
    }
}
