//! Synthetic event generation
//!
//! Produces realistic valid events, a catalogue of single-fault invalid
//! payloads, and spam/replay variants for anti-abuse testing.

use rand::Rng;
use serde_json::Value;
use std::fmt;

use crate::models::{ChantEvent, EventField, Tier};

/// Device identity used when none is configured
pub const DEFAULT_DEVICE_ID: &str = "B43A45A16938";

/// Well-formed device identity that is not registered with the gateway
pub const UNAUTHORIZED_DEVICE_ID: &str = "DEADBEEF0001";

/// Number of replayed events in the spam catalogue
const REPLAY_COPIES: usize = 3;

/// Current wall-clock time in epoch milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a valid event for `device_id`, stamped with the current time
pub fn generate_valid_event(device_id: &str) -> ChantEvent {
    valid_event_with(&mut rand::rng(), device_id, now_millis())
}

/// Generate a valid event from an explicit RNG and timestamp
pub fn valid_event_with<R: Rng + ?Sized>(rng: &mut R, device_id: &str, ts: i64) -> ChantEvent {
    let tiers = Tier::all();
    let tier = tiers[rng.random_range(0..tiers.len())];

    let event = ChantEvent {
        device_id: device_id.to_string(),
        match_id: rng.random_range(1..=99_999),
        tier,
        peak_db: round_to(rng.random_range(tier.peak_db_range()), 2),
        duration_ms: rng.random_range(2_000..=30_000),
        ts,
        chant_detected: rng.random_bool(0.5),
        signal_quality: Some(round_to(rng.random_range(0.5..=1.0), 3)),
        detection_confidence: Some(round_to(rng.random_range(0.6..=0.95), 3)),
        frequency_peak: Some(round_to(rng.random_range(200.0..=1500.0), 1)),
        background_noise: Some(round_to(rng.random_range(-60.0..=-40.0), 2)),
    };
    debug_assert!(event.is_valid(), "generated event violates {:?}", event.violations());
    event
}

/// The single validation rule an invalid payload breaks
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidReason {
    MissingDeviceId,
    MalformedDeviceId,
    UnknownTier,
    PeakDbOutOfRange,
    NegativeDuration,
    SignalQualityOutOfRange,
}

impl InvalidReason {
    pub fn all() -> [InvalidReason; 6] {
        [
            InvalidReason::MissingDeviceId,
            InvalidReason::MalformedDeviceId,
            InvalidReason::UnknownTier,
            InvalidReason::PeakDbOutOfRange,
            InvalidReason::NegativeDuration,
            InvalidReason::SignalQualityOutOfRange,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            InvalidReason::MissingDeviceId => "Missing deviceId",
            InvalidReason::MalformedDeviceId => "Invalid deviceId format",
            InvalidReason::UnknownTier => "Invalid tier",
            InvalidReason::PeakDbOutOfRange => "dB out of range",
            InvalidReason::NegativeDuration => "Negative duration",
            InvalidReason::SignalQualityOutOfRange => "Signal quality out of range",
        }
    }

    /// Field altered by this variant
    pub fn field(&self) -> EventField {
        match self {
            InvalidReason::MissingDeviceId | InvalidReason::MalformedDeviceId => {
                EventField::DeviceId
            }
            InvalidReason::UnknownTier => EventField::Tier,
            InvalidReason::PeakDbOutOfRange => EventField::PeakDb,
            InvalidReason::NegativeDuration => EventField::DurationMs,
            InvalidReason::SignalQualityOutOfRange => EventField::SignalQuality,
        }
    }

    /// Apply this fault to a payload object
    fn apply(&self, payload: &mut serde_json::Map<String, Value>) {
        let key = self.field().json_key().to_string();
        match self {
            InvalidReason::MissingDeviceId => {
                payload.remove(&key);
            }
            InvalidReason::MalformedDeviceId => {
                payload.insert(key, Value::from("INVALID123"));
            }
            InvalidReason::UnknownTier => {
                payload.insert(key, Value::from("platinum"));
            }
            InvalidReason::PeakDbOutOfRange => {
                payload.insert(key, Value::from(50.0));
            }
            InvalidReason::NegativeDuration => {
                payload.insert(key, Value::from(-1000));
            }
            InvalidReason::SignalQualityOutOfRange => {
                payload.insert(key, Value::from(1.5));
            }
        }
    }
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A payload with exactly one constraint violated
#[derive(Clone, Debug)]
pub struct InvalidEvent {
    pub payload: Value,
    pub reason: InvalidReason,
}

impl InvalidEvent {
    /// Test name for the `index`-th catalogue entry
    pub fn test_name(&self, index: usize) -> String {
        format!("invalid_event_{}_{}", index, self.reason.label().replace(' ', "_"))
    }
}

/// Build the invalid-event catalogue from a fresh valid event
pub fn generate_invalid_events(device_id: &str) -> serde_json::Result<Vec<InvalidEvent>> {
    invalid_events_from(&generate_valid_event(device_id))
}

/// Build the invalid-event catalogue from `base`, one altered field per entry
pub fn invalid_events_from(base: &ChantEvent) -> serde_json::Result<Vec<InvalidEvent>> {
    let base_payload = base.to_payload()?;
    let Value::Object(base_map) = base_payload else {
        return Ok(Vec::new());
    };

    Ok(InvalidReason::all()
        .into_iter()
        .map(|reason| {
            let mut map = base_map.clone();
            reason.apply(&mut map);
            InvalidEvent {
                payload: Value::Object(map),
                reason,
            }
        })
        .collect())
}

/// Event from a well-formed identity outside the authorized set
pub fn unauthorized_event() -> ChantEvent {
    generate_valid_event(UNAUTHORIZED_DEVICE_ID)
}

/// Events that anti-abuse logic should block: replays sharing one timestamp,
/// then one event from an unauthorized device.
pub fn generate_spam_events(device_id: &str) -> Vec<ChantEvent> {
    let base_ts = now_millis();
    let mut rng = rand::rng();

    let mut events: Vec<ChantEvent> = (0..REPLAY_COPIES)
        .map(|_| valid_event_with(&mut rng, device_id, base_ts))
        .collect();
    events.push(valid_event_with(&mut rng, UNAUTHORIZED_DEVICE_ID, base_ts));
    events
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        is_valid_device_id, BACKGROUND_NOISE_RANGE, DETECTION_CONFIDENCE_RANGE,
        FREQUENCY_PEAK_RANGE, PEAK_DB_RANGE, SIGNAL_QUALITY_RANGE,
    };
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn differing_fields(a: &Value, b: &Value) -> Vec<String> {
        let (Value::Object(a), Value::Object(b)) = (a, b) else {
            panic!("payloads must be objects");
        };
        let mut keys: Vec<&String> = a.keys().chain(b.keys()).collect();
        keys.sort();
        keys.dedup();
        keys.into_iter()
            .filter(|k| a.get(*k) != b.get(*k))
            .cloned()
            .collect()
    }

    #[test]
    fn test_valid_events_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for i in 0..2_000 {
            let event = valid_event_with(&mut rng, DEFAULT_DEVICE_ID, 1_700_000_000_000 + i);

            assert!(event.is_valid(), "violations: {:?}", event.violations());
            assert!(event.tier.peak_db_range().contains(&event.peak_db));
            assert!(PEAK_DB_RANGE.contains(&event.peak_db));
            assert!((2_000..=30_000).contains(&event.duration_ms));
            assert!((1..=99_999).contains(&event.match_id));

            let sq = event.signal_quality.unwrap();
            assert!((0.5..=1.0).contains(&sq) && SIGNAL_QUALITY_RANGE.contains(&sq));
            let dc = event.detection_confidence.unwrap();
            assert!((0.6..=0.95).contains(&dc) && DETECTION_CONFIDENCE_RANGE.contains(&dc));
            let fp = event.frequency_peak.unwrap();
            assert!((200.0..=1500.0).contains(&fp) && FREQUENCY_PEAK_RANGE.contains(&fp));
            let bn = event.background_noise.unwrap();
            assert!((-60.0..=-40.0).contains(&bn) && BACKGROUND_NOISE_RANGE.contains(&bn));
        }
    }

    #[test]
    fn test_all_tiers_are_generated() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(valid_event_with(&mut rng, DEFAULT_DEVICE_ID, 0).tier);
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_generate_valid_event_uses_current_time() {
        let before = now_millis();
        let event = generate_valid_event(DEFAULT_DEVICE_ID);
        let after = now_millis();
        assert!(event.ts >= before && event.ts <= after);
        assert_eq!(event.device_id, DEFAULT_DEVICE_ID);
    }

    #[test]
    fn test_invalid_events_alter_exactly_one_field() {
        let base = generate_valid_event(DEFAULT_DEVICE_ID);
        let base_payload = base.to_payload().unwrap();
        let variants = invalid_events_from(&base).unwrap();

        assert_eq!(variants.len(), InvalidReason::all().len());
        for variant in &variants {
            let diff = differing_fields(&base_payload, &variant.payload);
            assert_eq!(diff, vec![variant.reason.field().json_key().to_string()]);
        }
    }

    #[test]
    fn test_invalid_variants_fail_local_validation() {
        let base = generate_valid_event(DEFAULT_DEVICE_ID);
        for variant in invalid_events_from(&base).unwrap() {
            match serde_json::from_value::<ChantEvent>(variant.payload.clone()) {
                // Structurally broken payloads never parse
                Err(_) => {}
                Ok(event) => assert_eq!(event.violations(), vec![variant.reason.field()]),
            }
        }
    }

    #[test]
    fn test_invalid_event_names() {
        let variants = generate_invalid_events(DEFAULT_DEVICE_ID).unwrap();
        assert_eq!(variants[0].test_name(0), "invalid_event_0_Missing_deviceId");
        assert_eq!(
            variants[5].test_name(5),
            "invalid_event_5_Signal_quality_out_of_range"
        );
    }

    #[test]
    fn test_spam_events() {
        let events = generate_spam_events(DEFAULT_DEVICE_ID);
        assert_eq!(events.len(), REPLAY_COPIES + 1);

        let replays = &events[..REPLAY_COPIES];
        assert!(replays.iter().all(|e| e.ts == replays[0].ts));
        assert!(replays.iter().all(|e| e.device_id == DEFAULT_DEVICE_ID));

        let unauthorized = events.last().unwrap();
        assert_eq!(unauthorized.device_id, UNAUTHORIZED_DEVICE_ID);
        assert!(is_valid_device_id(&unauthorized.device_id));
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(-23.456_78, 2), -23.46);
        assert_eq!(round_to(0.123_45, 3), 0.123);
    }
}
