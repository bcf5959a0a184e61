//! Load test execution engine
//!
//! Runs a fixed number of simulated users, each submitting valid events
//! back to back until a shared deadline, and aggregates their samples.

use anyhow::Result;
use futures::future::join_all;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::metrics::{LoadMetrics, WorkerSamples};
use crate::config::HarnessConfig;
use crate::generator::{generate_valid_event, now_millis};
use crate::http::HttpClient;
use crate::models::{Endpoint, ACCEPTED};

/// Load driver
pub struct LoadDriver {
    http_client: HttpClient,
    device_id: String,
    users: usize,
    duration: Duration,
    pause: Duration,
}

impl LoadDriver {
    /// Create a driver from the harness configuration
    pub fn new(config: &HarnessConfig) -> Result<Self> {
        let http_client =
            HttpClient::with_timeout(config.timeout_secs)?.base_url(config.gateway_url.clone());

        Ok(Self {
            http_client,
            device_id: config.device_id.clone(),
            users: config.concurrent_users,
            duration: config.test_duration(),
            pause: config.timing.load_pause(),
        })
    }

    /// Run the load test
    pub async fn run(&self) -> LoadMetrics {
        info!(
            "Starting load test: {} users for {:.1}s",
            self.users,
            self.duration.as_secs_f64()
        );

        let start = Instant::now();
        let deadline = start + self.duration;

        let handles: Vec<_> = (0..self.users)
            .map(|worker| {
                tokio::spawn(run_worker(
                    self.http_client.clone(),
                    self.device_id.clone(),
                    worker,
                    deadline,
                    self.pause,
                ))
            })
            .collect();

        let mut samples = WorkerSamples::new();
        for (worker, outcome) in join_all(handles).await.into_iter().enumerate() {
            match outcome {
                Ok(worker_samples) => samples.merge(worker_samples),
                Err(e) => {
                    warn!("Load worker {} did not complete: {}", worker, e);
                    samples.record_other(format!("load worker {worker} failed: {e}"));
                }
            }
        }

        let metrics = samples.finalize(start.elapsed());
        info!("Load test complete: {}", metrics);
        metrics
    }
}

/// One simulated user
async fn run_worker(
    client: HttpClient,
    device_id: String,
    worker: usize,
    deadline: Instant,
    pause: Duration,
) -> WorkerSamples {
    let mut samples = WorkerSamples::new();

    while Instant::now() < deadline {
        let mut event = generate_valid_event(&device_id);
        // Offsetting by worker index keeps same-millisecond submissions distinct
        event.ts = now_millis() + worker as i64;

        match event.to_payload() {
            Ok(payload) => {
                let request_start = Instant::now();
                match client.post_json(Endpoint::Events.path(), &payload).await {
                    Ok(resp) if resp.status_code == ACCEPTED => {
                        samples.record_success(request_start.elapsed().as_secs_f64() * 1000.0)
                    }
                    Ok(resp) => samples.record_status(resp.status_code),
                    Err(e) => samples.record_transport(&e),
                }
            }
            Err(e) => samples.record_other(format!("failed to encode event: {e}")),
        }

        sleep(pause).await;
    }

    debug!(
        "Worker {} finished: {} ok, {} failed",
        worker,
        samples.success_count(),
        samples.error_count()
    );
    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_gateway::{MockGateway, MockOptions};

    #[tokio::test]
    async fn test_load_against_accepting_gateway() {
        let gateway = MockGateway::start(MockOptions {
            accept_all: true,
            event_delay: Duration::from_millis(10),
            ..Default::default()
        })
        .await;

        let config = HarnessConfig::new(gateway.http_url())
            .with_users(5)
            .with_duration(2);
        let driver = LoadDriver::new(&config).unwrap();

        let metrics = driver.run().await;

        assert!(metrics.total_requests > 0);
        assert_eq!(metrics.failed_requests, 0);
        assert_eq!(metrics.error_rate, 0.0);
        assert!(metrics.avg_latency_ms >= 10.0);
        assert!(metrics.p95_latency_ms >= metrics.avg_latency_ms * 0.5);
        // 10ms simulated latency; p95 stays within a small multiple of it
        assert!(metrics.p95_latency_ms < 10.0 * 10.0);
        assert!(metrics.p95_latency_ms <= metrics.max_latency_ms);
        assert!(metrics.throughput_rps > 0.0);
        assert!(metrics.duration_secs >= 2.0);
    }

    #[tokio::test]
    async fn test_load_against_unreachable_gateway() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let config = HarnessConfig::new(format!("http://127.0.0.1:{port}")).with_users(2);
        let mut driver = LoadDriver::new(&config).unwrap();
        driver.duration = Duration::from_millis(300);

        let metrics = driver.run().await;

        assert!(metrics.failed_requests > 0);
        assert_eq!(metrics.successful_requests, 0);
        assert_eq!(metrics.error_rate, 1.0);
        assert_eq!(metrics.throughput_rps, 0.0);
        assert!(metrics.errors.connection_errors > 0);
    }

    #[tokio::test]
    async fn test_zero_users_yields_empty_metrics() {
        let config = HarnessConfig::default();
        let mut driver = LoadDriver::new(&config).unwrap();
        driver.users = 0;
        driver.duration = Duration::from_millis(10);

        let metrics = driver.run().await;
        assert_eq!(metrics.total_requests, 0);
        assert_eq!(metrics.error_rate, 1.0);
    }
}
