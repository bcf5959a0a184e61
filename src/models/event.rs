//! Device event model
//!
//! Wire schema for a chant/audio detection event as accepted by the gateway's
//! `POST /events` endpoint, plus the field constraints the gateway enforces.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Accepted peak level range (dBFS)
pub const PEAK_DB_RANGE: RangeInclusive<f64> = -100.0..=0.0;

/// Accepted signal quality range
pub const SIGNAL_QUALITY_RANGE: RangeInclusive<f64> = 0.0..=1.0;

/// Accepted detection confidence range
pub const DETECTION_CONFIDENCE_RANGE: RangeInclusive<f64> = 0.0..=1.0;

/// Accepted dominant frequency range (Hz)
pub const FREQUENCY_PEAK_RANGE: RangeInclusive<f64> = 20.0..=20_000.0;

/// Accepted background noise range (dB)
pub const BACKGROUND_NOISE_RANGE: RangeInclusive<f64> = -100.0..=0.0;

/// Length of a device identity (MAC address without separators)
pub const DEVICE_ID_LEN: usize = 12;

/// Signal-strength tier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
}

impl Tier {
    /// Get all tiers, weakest first
    pub fn all() -> [Tier; 3] {
        [Tier::Bronze, Tier::Silver, Tier::Gold]
    }

    /// Wire name
    pub fn name(&self) -> &'static str {
        match self {
            Tier::Bronze => "bronze",
            Tier::Silver => "silver",
            Tier::Gold => "gold",
        }
    }

    /// Realistic peak level range for events of this tier.
    ///
    /// Stronger tiers sit higher; ranges overlap, which is what devices report.
    pub fn peak_db_range(&self) -> RangeInclusive<f64> {
        match self {
            Tier::Bronze => -30.0..=-20.0,
            Tier::Silver => -25.0..=-15.0,
            Tier::Gold => -20.0..=-10.0,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Event fields, named by their JSON key
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventField {
    DeviceId,
    MatchId,
    Tier,
    PeakDb,
    DurationMs,
    Ts,
    ChantDetected,
    SignalQuality,
    DetectionConfidence,
    FrequencyPeak,
    BackgroundNoise,
}

impl EventField {
    pub fn json_key(&self) -> &'static str {
        match self {
            EventField::DeviceId => "deviceId",
            EventField::MatchId => "matchId",
            EventField::Tier => "tier",
            EventField::PeakDb => "peakDb",
            EventField::DurationMs => "durationMs",
            EventField::Ts => "ts",
            EventField::ChantDetected => "chantDetected",
            EventField::SignalQuality => "signalQuality",
            EventField::DetectionConfidence => "detectionConfidence",
            EventField::FrequencyPeak => "frequencyPeak",
            EventField::BackgroundNoise => "backgroundNoise",
        }
    }
}

impl fmt::Display for EventField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.json_key())
    }
}

/// A single device-originated chant detection record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChantEvent {
    pub device_id: String,
    pub match_id: u32,
    pub tier: Tier,
    pub peak_db: f64,
    pub duration_ms: i64,
    /// Epoch milliseconds
    pub ts: i64,
    pub chant_detected: bool,
    pub signal_quality: Option<f64>,
    pub detection_confidence: Option<f64>,
    pub frequency_peak: Option<f64>,
    pub background_noise: Option<f64>,
}

impl ChantEvent {
    /// JSON object as submitted to the gateway
    pub fn to_payload(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    /// Fields that violate the gateway's constraints, in declaration order
    pub fn violations(&self) -> Vec<EventField> {
        let mut violations = Vec::new();

        if !is_valid_device_id(&self.device_id) {
            violations.push(EventField::DeviceId);
        }
        if !in_range(self.peak_db, &PEAK_DB_RANGE) {
            violations.push(EventField::PeakDb);
        }
        if self.duration_ms < 0 {
            violations.push(EventField::DurationMs);
        }
        if self.ts < 0 {
            violations.push(EventField::Ts);
        }

        let optional = [
            (EventField::SignalQuality, self.signal_quality, &SIGNAL_QUALITY_RANGE),
            (
                EventField::DetectionConfidence,
                self.detection_confidence,
                &DETECTION_CONFIDENCE_RANGE,
            ),
            (EventField::FrequencyPeak, self.frequency_peak, &FREQUENCY_PEAK_RANGE),
            (EventField::BackgroundNoise, self.background_noise, &BACKGROUND_NOISE_RANGE),
        ];
        for (field, value, range) in optional {
            if let Some(v) = value {
                if !in_range(v, range) {
                    violations.push(field);
                }
            }
        }

        violations
    }

    pub fn is_valid(&self) -> bool {
        self.violations().is_empty()
    }
}

/// Check the authorized device identity format: 12 uppercase hex characters
pub fn is_valid_device_id(id: &str) -> bool {
    id.len() == DEVICE_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
}

fn in_range(value: f64, range: &RangeInclusive<f64>) -> bool {
    value.is_finite() && range.contains(&value)
}
