//! Gateway contract models
//!
//! Endpoint paths, status codes and payload markers the harness checks
//! the FanPulse gateway against.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status code for an accepted event submission
pub const ACCEPTED: u16 = 202;

/// Metric names that must appear in the metrics exposition
pub const REQUIRED_METRICS: [&str; 3] = [
    "fanpulse_events_total",
    "fanpulse_batches_total",
    "fanpulse_queue_length",
];

/// Top-level sections of the status document
pub const STATUS_SECTIONS: [&str; 5] = ["events", "batches", "config", "stats", "system"];

/// HTTP endpoints exposed by the gateway
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Health,
    Events,
    Status,
    Metrics,
}

impl Endpoint {
    /// Path relative to the gateway base URL
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Health => "/health",
            Endpoint::Events => "/events",
            Endpoint::Status => "/status",
            Endpoint::Metrics => "/metrics",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Message kinds pushed over the streaming channel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamMessageKind {
    Connected,
    EventReceived,
}

impl StreamMessageKind {
    /// Wire value of the `type` field
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamMessageKind::Connected => "connected",
            StreamMessageKind::EventReceived => "event_received",
        }
    }
}

/// Batch counters reported under `batches` in the status document
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchStatus {
    pub total: u64,
}

impl BatchStatus {
    /// Extract from a status document; absent or malformed sections read as zero
    pub fn from_status(status: &serde_json::Value) -> Self {
        status
            .get("batches")
            .cloned()
            .and_then(|batches| serde_json::from_value(batches).ok())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(Endpoint::Health.path(), "/health");
        assert_eq!(Endpoint::Events.to_string(), "/events");
        assert_eq!(Endpoint::Metrics.path(), "/metrics");
    }

    #[test]
    fn test_stream_message_kind() {
        assert_eq!(StreamMessageKind::Connected.as_str(), "connected");
        assert_eq!(StreamMessageKind::EventReceived.as_str(), "event_received");
        assert_eq!(
            serde_json::to_value(StreamMessageKind::EventReceived).unwrap(),
            "event_received"
        );
    }

    #[test]
    fn test_batch_status_from_status() {
        let status = json!({"batches": {"total": 4, "pending": 1}});
        assert_eq!(BatchStatus::from_status(&status).total, 4);

        assert_eq!(BatchStatus::from_status(&json!({})).total, 0);
        assert_eq!(
            BatchStatus::from_status(&json!({"batches": "n/a"})).total,
            0
        );
    }
}
