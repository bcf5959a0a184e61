//! Configuration module
//!
//! Run parameters shared read-only by every component. Values are layered:
//! defaults, then a config file, then `FANPULSE_HARNESS_*` environment
//! variables, then command-line flags.

pub mod env;
mod file;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::generator::DEFAULT_DEVICE_ID;
use crate::load::LoadTargets;
use crate::models::is_valid_device_id;

pub use env::EnvConfig;
pub use file::find_config_file;

/// Harness configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Gateway HTTP base URL
    pub gateway_url: String,

    /// Streaming (WebSocket) endpoint
    pub websocket_url: String,

    /// HTTP request timeout in seconds
    pub timeout_secs: u64,

    /// Enable debug logging
    pub verbose: bool,

    /// Simulated users for the load test
    pub concurrent_users: usize,

    /// Load test duration in seconds
    pub test_duration_secs: u64,

    /// Device identity used for generated events
    pub device_id: String,

    /// Fixed delays and batch sizing
    pub timing: TimingConfig,

    /// Performance targets for the load test
    pub targets: LoadTargets,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            gateway_url: "http://localhost:4000".to_string(),
            websocket_url: "ws://localhost:4001".to_string(),
            timeout_secs: 30,
            verbose: false,
            concurrent_users: 1,
            test_duration_secs: 60,
            device_id: DEFAULT_DEVICE_ID.to_string(),
            timing: TimingConfig::default(),
            targets: LoadTargets::default(),
        }
    }
}

impl HarnessConfig {
    pub fn test_duration(&self) -> Duration {
        Duration::from_secs(self.test_duration_secs)
    }

    /// Apply environment overrides
    pub fn apply_env(&mut self, env: &EnvConfig) {
        if let Some(url) = &env.gateway_url {
            self.gateway_url = url.clone();
        }
        if let Some(url) = &env.websocket_url {
            self.websocket_url = url.clone();
        }
        if let Some(timeout) = env.timeout {
            self.timeout_secs = timeout;
        }
        if let Some(users) = env.users {
            self.concurrent_users = users;
        }
        if let Some(duration) = env.duration {
            self.test_duration_secs = duration;
        }
        if let Some(device_id) = &env.device_id {
            self.device_id = device_id.clone();
        }
        if let Some(verbose) = env.verbose {
            self.verbose = verbose;
        }
    }

    /// Reject configurations the harness cannot run with
    pub fn validate(&self) -> Result<()> {
        if !(self.gateway_url.starts_with("http://") || self.gateway_url.starts_with("https://"))
        {
            bail!("gateway_url must be an http(s) URL: {}", self.gateway_url);
        }
        if !(self.websocket_url.starts_with("ws://") || self.websocket_url.starts_with("wss://")) {
            bail!("websocket_url must be a ws(s) URL: {}", self.websocket_url);
        }
        if self.timeout_secs == 0 {
            bail!("timeout_secs must be greater than 0");
        }
        if self.concurrent_users == 0 {
            bail!("concurrent_users must be greater than 0");
        }
        if self.test_duration_secs == 0 {
            bail!("test_duration_secs must be greater than 0");
        }
        if !is_valid_device_id(&self.device_id) {
            bail!(
                "device_id must be 12 uppercase hex characters: {}",
                self.device_id
            );
        }
        if self.timing.batch_size == 0 {
            bail!("timing.batch_size must be greater than 0");
        }
        Ok(())
    }
}

/// Fixed delays used by the functional suite and load driver.
///
/// Defaults reproduce the gateway team's reference timings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Pause before resubmitting a replayed event
    pub replay_delay_ms: u64,

    /// Events submitted by the batch processing check
    pub batch_size: usize,

    /// Pause between batch events
    pub batch_interval_ms: u64,

    /// Time allowed for the stream subscription to settle
    pub stream_settle_ms: u64,

    /// Observation window after the streamed submission
    pub stream_window_ms: u64,

    /// Upper bound on stream connect and shutdown
    pub stream_connect_timeout_ms: u64,

    /// Pause between requests of one load worker
    pub load_pause_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            replay_delay_ms: 100,
            batch_size: 5,
            batch_interval_ms: 100,
            stream_settle_ms: 1000,
            stream_window_ms: 2000,
            stream_connect_timeout_ms: 5000,
            load_pause_ms: 100,
        }
    }
}

impl TimingConfig {
    pub fn replay_delay(&self) -> Duration {
        Duration::from_millis(self.replay_delay_ms)
    }

    pub fn batch_interval(&self) -> Duration {
        Duration::from_millis(self.batch_interval_ms)
    }

    pub fn stream_settle(&self) -> Duration {
        Duration::from_millis(self.stream_settle_ms)
    }

    pub fn stream_window(&self) -> Duration {
        Duration::from_millis(self.stream_window_ms)
    }

    pub fn stream_connect_timeout(&self) -> Duration {
        Duration::from_millis(self.stream_connect_timeout_ms)
    }

    pub fn load_pause(&self) -> Duration {
        Duration::from_millis(self.load_pause_ms)
    }
}

#[cfg(test)]
impl HarnessConfig {
    /// Create with gateway URL
    pub fn new(gateway_url: impl Into<String>) -> Self {
        Self {
            gateway_url: gateway_url.into(),
            ..Default::default()
        }
    }

    pub fn with_websocket_url(mut self, url: impl Into<String>) -> Self {
        self.websocket_url = url.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_users(mut self, users: usize) -> Self {
        self.concurrent_users = users;
        self
    }

    pub fn with_duration(mut self, secs: u64) -> Self {
        self.test_duration_secs = secs;
        self
    }

    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = device_id.into();
        self
    }

    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HarnessConfig::default();
        assert_eq!(config.gateway_url, "http://localhost:4000");
        assert_eq!(config.websocket_url, "ws://localhost:4001");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.device_id, "B43A45A16938");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = HarnessConfig::new("http://10.0.0.5:4000")
            .with_users(10)
            .with_duration(5)
            .with_verbose(true);

        assert_eq!(config.gateway_url, "http://10.0.0.5:4000");
        assert_eq!(config.concurrent_users, 10);
        assert_eq!(config.test_duration(), Duration::from_secs(5));
        assert!(config.verbose);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(HarnessConfig::new("localhost:4000").validate().is_err());
        assert!(HarnessConfig::default()
            .with_websocket_url("http://localhost:4001")
            .validate()
            .is_err());
        assert!(HarnessConfig::default().with_users(0).validate().is_err());
        assert!(HarnessConfig::default().with_duration(0).validate().is_err());
        assert!(HarnessConfig::default()
            .with_device_id("INVALID123")
            .validate()
            .is_err());
    }

    #[test]
    fn test_apply_env() {
        let mut config = HarnessConfig::default();
        let env = EnvConfig {
            gateway_url: Some("http://gateway:4000".to_string()),
            users: Some(8),
            verbose: Some(true),
            ..Default::default()
        };
        config.apply_env(&env);

        assert_eq!(config.gateway_url, "http://gateway:4000");
        assert_eq!(config.concurrent_users, 8);
        assert!(config.verbose);
        assert_eq!(config.websocket_url, "ws://localhost:4001");
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: HarnessConfig =
            serde_yaml::from_str("gateway_url: http://gw:4000\ntiming:\n  batch_size: 3\n")
                .unwrap();
        assert_eq!(config.gateway_url, "http://gw:4000");
        assert_eq!(config.timing.batch_size, 3);
        assert_eq!(config.timing.stream_window_ms, 2000);
        assert_eq!(config.timeout_secs, 30);
    }
}
