//! Data models for gateway testing
//!
//! Event wire schema, the gateway contract, and the records produced by
//! test runs.

mod event;
mod gateway;
mod test_result;

pub use event::{is_valid_device_id, ChantEvent, EventField, Tier};
#[cfg(test)]
pub use event::{
    BACKGROUND_NOISE_RANGE, DETECTION_CONFIDENCE_RANGE, FREQUENCY_PEAK_RANGE, PEAK_DB_RANGE,
    SIGNAL_QUALITY_RANGE,
};
pub use gateway::{
    BatchStatus, Endpoint, StreamMessageKind, ACCEPTED, REQUIRED_METRICS, STATUS_SECTIONS,
};
pub use test_result::{ResultLog, TestResult};
