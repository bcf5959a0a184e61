//! Single-event prober
//!
//! Submits one payload to the events endpoint and judges the outcome
//! against whether the gateway should have accepted it.

use serde_json::Value;
use tracing::{error, info};

use crate::http::HttpClient;
use crate::models::{ChantEvent, Endpoint, TestResult, ACCEPTED};
use crate::utils::Timer;

/// Probes the gateway with individual event submissions
#[derive(Clone, Debug)]
pub struct EventProber {
    client: HttpClient,
}

impl EventProber {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Submit `payload` and record whether acceptance matched `should_pass`.
    ///
    /// Transport failures become failed results; this never errors.
    pub async fn probe(&self, payload: &Value, test_name: &str, should_pass: bool) -> TestResult {
        let timer = Timer::start(test_name);

        let response = match self.client.post_json(Endpoint::Events.path(), payload).await {
            Ok(response) => response,
            Err(e) => {
                error!("{} failed: {:#}", test_name, e);
                return TestResult::fail(test_name, timer.stop(), format!("{e:#}"));
            }
        };

        let accepted = response.status_code == ACCEPTED;
        let passed = accepted == should_pass;
        let failure = if should_pass {
            format!("expected acceptance, got HTTP {}", response.status_code)
        } else {
            format!(
                "expected rejection, gateway accepted with HTTP {}",
                response.status_code
            )
        };

        if passed {
            info!("✓ {} - HTTP {}", test_name, response.status_code);
        } else {
            error!("✗ {} - {}", test_name, failure);
        }

        TestResult::verdict(test_name, passed, timer.stop(), failure)
            .with_response_opt(response.json())
    }

    /// Serialize a typed event and probe it
    pub async fn probe_event(
        &self,
        event: &ChantEvent,
        test_name: &str,
        should_pass: bool,
    ) -> TestResult {
        match event.to_payload() {
            Ok(payload) => self.probe(&payload, test_name, should_pass).await,
            Err(e) => TestResult::fail(test_name, 0.0, format!("failed to encode event: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{generate_valid_event, DEFAULT_DEVICE_ID};
    use crate::mock_gateway::{MockGateway, MockOptions};

    async fn prober_for(gateway: &MockGateway) -> EventProber {
        EventProber::new(
            HttpClient::with_timeout(5)
                .unwrap()
                .base_url(gateway.http_url()),
        )
    }

    #[tokio::test]
    async fn test_probe_accepted_and_replayed() {
        let gateway = MockGateway::start(MockOptions::default()).await;
        let prober = prober_for(&gateway).await;
        let payload = generate_valid_event(DEFAULT_DEVICE_ID).to_payload().unwrap();

        let first = prober.probe(&payload, "duplicate_test_first", true).await;
        assert!(first.passed, "{first}");
        assert!(first.error_message.is_none());
        assert_eq!(first.response_data.unwrap()["status"], "accepted");

        let second = prober.probe(&payload, "duplicate_test_second", false).await;
        assert!(second.passed, "{second}");
        assert_eq!(gateway.accepted(), 1);
        assert_eq!(gateway.rejected(), 1);
    }

    #[tokio::test]
    async fn test_probe_failure_messages() {
        let gateway = MockGateway::start(MockOptions::default()).await;
        let prober = prober_for(&gateway).await;
        let event = generate_valid_event(DEFAULT_DEVICE_ID);

        let wrong = prober.probe_event(&event, "valid_event", false).await;
        assert!(!wrong.passed);
        assert_eq!(
            wrong.error_message.as_deref(),
            Some("expected rejection, gateway accepted with HTTP 202")
        );

        let replay = prober.probe_event(&event, "valid_event", true).await;
        assert!(!replay.passed);
        assert_eq!(
            replay.error_message.as_deref(),
            Some("expected acceptance, got HTTP 409")
        );
    }

    #[tokio::test]
    async fn test_probe_transport_failure() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let prober = EventProber::new(
            HttpClient::with_timeout(2)
                .unwrap()
                .base_url(format!("http://127.0.0.1:{port}")),
        );
        let event = generate_valid_event(DEFAULT_DEVICE_ID);

        let result = prober.probe_event(&event, "valid_event", true).await;
        assert!(!result.passed);
        assert!(result
            .error_message
            .unwrap()
            .starts_with("Connection refused"));
    }
}
