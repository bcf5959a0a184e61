//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "FANPULSE_HARNESS";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Gateway URL from FANPULSE_HARNESS_GATEWAY_URL
    pub gateway_url: Option<String>,
    /// WebSocket URL from FANPULSE_HARNESS_WEBSOCKET_URL
    pub websocket_url: Option<String>,
    /// Timeout from FANPULSE_HARNESS_TIMEOUT
    pub timeout: Option<u64>,
    /// Concurrent users from FANPULSE_HARNESS_USERS
    pub users: Option<usize>,
    /// Load duration from FANPULSE_HARNESS_DURATION
    pub duration: Option<u64>,
    /// Device identity from FANPULSE_HARNESS_DEVICE_ID
    pub device_id: Option<String>,
    /// Verbose from FANPULSE_HARNESS_VERBOSE
    pub verbose: Option<bool>,
    /// Config file from FANPULSE_HARNESS_CONFIG
    pub config_file: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            gateway_url: get_env("GATEWAY_URL"),
            websocket_url: get_env("WEBSOCKET_URL"),
            timeout: get_env_parse("TIMEOUT"),
            users: get_env_parse("USERS"),
            duration: get_env_parse("DURATION"),
            device_id: get_env("DEVICE_ID"),
            verbose: get_env_bool("VERBOSE"),
            config_file: get_env("CONFIG"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.gateway_url.is_some()
            || self.websocket_url.is_some()
            || self.timeout.is_some()
            || self.users.is_some()
            || self.duration.is_some()
            || self.device_id.is_some()
            || self.verbose.is_some()
            || self.config_file.is_some()
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        if !self.has_any() {
            println!("  (no {ENV_PREFIX}_* variables set)");
            return;
        }
        println!("  {}_GATEWAY_URL:   {:?}", ENV_PREFIX, self.gateway_url);
        println!("  {}_WEBSOCKET_URL: {:?}", ENV_PREFIX, self.websocket_url);
        println!("  {}_TIMEOUT:       {:?}", ENV_PREFIX, self.timeout);
        println!("  {}_USERS:         {:?}", ENV_PREFIX, self.users);
        println!("  {}_DURATION:      {:?}", ENV_PREFIX, self.duration);
        println!("  {}_DEVICE_ID:     {:?}", ENV_PREFIX, self.device_id);
        println!("  {}_VERBOSE:       {:?}", ENV_PREFIX, self.verbose);
        println!("  {}_CONFIG:        {:?}", ENV_PREFIX, self.config_file);
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.parse().ok())
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| {
        matches!(
            v.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on" | "enabled"
        )
    })
}

/// Print all FANPULSE_HARNESS environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_GATEWAY_URL     Gateway HTTP base URL");
    println!("  {ENV_PREFIX}_WEBSOCKET_URL   Gateway streaming endpoint (ws://...)");
    println!("  {ENV_PREFIX}_TIMEOUT         Request timeout in seconds");
    println!("  {ENV_PREFIX}_USERS           Concurrent users for load tests");
    println!("  {ENV_PREFIX}_DURATION        Load test duration in seconds");
    println!("  {ENV_PREFIX}_DEVICE_ID       Device identity for generated events");
    println!("  {ENV_PREFIX}_VERBOSE         Enable verbose output (true/false)");
    println!("  {ENV_PREFIX}_CONFIG          Path to configuration file");
    println!();
    println!("Example:");
    println!("  export {ENV_PREFIX}_GATEWAY_URL=http://10.0.0.100:4000");
    println!("  fanpulse-harness run --suite functional");
}
